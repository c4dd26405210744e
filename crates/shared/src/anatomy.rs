//! Catálogo de huesos del cráneo

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Embed del cráneo completo
pub const SKULL_EMBED_URL: &str =
    "https://sketchfab.com/models/baf6ac7b781a46218dca2b59dee58817/embed?autostart=1";

/// Modelo local del cráneo completo
pub const SKULL_MODEL_PATH: &str = "models/skull.glb";

/// Modelo decorativo de la portada
pub const HERO_MODEL_PATH: &str = "models/book_anatomy.glb";

/// Identificador de hueso
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoneId {
    #[default]
    Frontal,
    Parietal,
    Temporal,
    Occipital,
    Maxilla,
    Mandible,
    Zygomatic,
}

/// Datos estáticos de un hueso
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneInfo {
    pub id: BoneId,
    pub name: &'static str,
    /// Color de acento RGB
    pub color: [u8; 3],
    pub description: &'static str,
    pub embed_url: &'static str,
}

const BONES: [BoneInfo; 7] = [
    BoneInfo {
        id: BoneId::Frontal,
        name: "Frontal",
        color: [0xff, 0x6b, 0x6b],
        description: "El hueso frontal forma la frente y la parte superior de las órbitas oculares. Protege el lóbulo frontal del cerebro.",
        embed_url: "https://sketchfab.com/models/b8a462158501416dbde8f924067d325f/embed?autostart=1",
    },
    BoneInfo {
        id: BoneId::Parietal,
        name: "Parietal",
        color: [0x4e, 0xcd, 0xc4],
        description: "Los huesos parietales forman la mayor parte de los lados y la parte superior del cráneo.",
        embed_url: "https://sketchfab.com/models/a1253109d8a1474bbbeed716227ba586/embed?autostart=1",
    },
    BoneInfo {
        id: BoneId::Temporal,
        name: "Temporal",
        color: [0x45, 0xb7, 0xd1],
        description: "El hueso temporal se encuentra en los lados del cráneo y contiene el oído interno.",
        embed_url: "https://sketchfab.com/models/8dec765f703d45fbb14460bbaa106c1c/embed?autostart=1",
    },
    BoneInfo {
        id: BoneId::Occipital,
        name: "Occipital",
        color: [0x96, 0xce, 0xb4],
        description: "El hueso occipital forma la parte posterior e inferior del cráneo.",
        embed_url: "https://sketchfab.com/models/f7b9dd2827a14e9999b01d2aeb794c12/embed?autostart=1",
    },
    BoneInfo {
        id: BoneId::Maxilla,
        name: "Maxilar",
        color: [0xf7, 0xdc, 0x6f],
        description: "El maxilar forma la mandíbula superior y sostiene los dientes superiores.",
        embed_url: "https://sketchfab.com/models/cbcbc30694c84f1c9f3ecfc57a635020/embed?autostart=1",
    },
    BoneInfo {
        id: BoneId::Mandible,
        name: "Mandíbula",
        color: [0xbb, 0x8f, 0xce],
        description: "La mandíbula es el hueso móvil de la mandíbula inferior.",
        embed_url: "https://sketchfab.com/models/1d3eb1b070a44aa88e576fa5c0544c8d/embed?autostart=1",
    },
    BoneInfo {
        id: BoneId::Zygomatic,
        name: "Cigomático",
        color: [0x85, 0xc1, 0xe9],
        description: "El cigomático forma el pómulo y parte de la órbita ocular.",
        embed_url: "https://sketchfab.com/models/2f28f3a686d84b69b3a36b9e1cf781b4/embed?autostart=1",
    },
];

impl BoneId {
    /// Todos los huesos en orden de presentación
    pub const ALL: [BoneId; 7] = [
        BoneId::Frontal,
        BoneId::Parietal,
        BoneId::Temporal,
        BoneId::Occipital,
        BoneId::Maxilla,
        BoneId::Mandible,
        BoneId::Zygomatic,
    ];

    /// Identificador corto usado en rutas de modelos
    pub fn slug(&self) -> &'static str {
        match self {
            BoneId::Frontal => "frontal",
            BoneId::Parietal => "parietal",
            BoneId::Temporal => "temporal",
            BoneId::Occipital => "occipital",
            BoneId::Maxilla => "maxilla",
            BoneId::Mandible => "mandible",
            BoneId::Zygomatic => "zygomatic",
        }
    }

    pub fn info(&self) -> &'static BoneInfo {
        &BONES[*self as usize]
    }

    /// Ruta relativa del modelo GLB del hueso
    pub fn model_path(&self) -> String {
        format!("models/{}.glb", self.slug())
    }
}

impl fmt::Display for BoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for BoneId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BoneId::ALL
            .iter()
            .copied()
            .find(|b| b.slug() == s)
            .ok_or_else(|| format!("hueso desconocido: {s}"))
    }
}
