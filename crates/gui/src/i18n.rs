use std::sync::atomic::{AtomicU8, Ordering};

use crate::state::Language;

static CURRENT_LANG: AtomicU8 = AtomicU8::new(0); // 0=Es (default)

pub fn lang() -> Language {
    match CURRENT_LANG.load(Ordering::Relaxed) {
        1 => Language::En,
        _ => Language::Es,
    }
}

pub fn set_lang(l: Language) {
    CURRENT_LANG.store(
        match l {
            Language::Es => 0,
            Language::En => 1,
        },
        Ordering::Relaxed,
    );
}

/// Translate a key to the current language.
pub fn t(key: &str) -> &'static str {
    let es = lang() == Language::Es;
    match key {
        // ── Navigation ──────────────────────────────────────
        "app.title" => "AnatomAR",
        "nav.home" => if es { "Inicio" } else { "Home" },
        "nav.explorer" => if es { "Explorar" } else { "Explore" },
        "nav.chat" => if es { "Asistente" } else { "Assistant" },
        "nav.settings" => if es { "Ajustes" } else { "Settings" },
        "nav.language" => if es { "Idioma" } else { "Language" },
        "nav.menu" => if es { "Menú" } else { "Menu" },

        // ── Hero ────────────────────────────────────────────
        "hero.title" => if es { "Descubre el cráneo humano" } else { "Discover the human skull" },
        "hero.subtitle" => if es {
            "Explora en 3D los huesos que protegen el cerebro y dan forma al rostro."
        } else {
            "Explore in 3D the bones that protect the brain and shape the face."
        },
        "hero.explore" => if es { "Comenzar a explorar" } else { "Start exploring" },

        // ── Explorer ────────────────────────────────────────
        "explorer.title" => if es { "Huesos del cráneo" } else { "Skull bones" },
        "explorer.catalog" => if es { "Catálogo" } else { "Catalog" },
        "explorer.skull" => if es { "Cráneo completo" } else { "Full skull" },
        "explorer.selected" => if es { "Hueso seleccionado" } else { "Selected bone" },
        "explorer.embeds" => if es { "Modelos interactivos" } else { "Interactive models" },

        // ── Viewer ──────────────────────────────────────────
        "viewer.loading" => if es { "Cargando modelo…" } else { "Loading model…" },
        "viewer.unavailable" => if es { "Visor 3D no disponible" } else { "3D viewer unavailable" },
        "viewer.hint" => if es {
            "Arrastra para girar · clic derecho para desplazar · rueda para acercar"
        } else {
            "Drag to rotate · right-click to pan · wheel to zoom"
        },

        // ── Embed ───────────────────────────────────────────
        "embed.open" => if es { "Abrir visor 3D" } else { "Open 3D viewer" },
        "embed.invalid" => if es { "Enlace no válido" } else { "Invalid link" },

        // ── Chat ────────────────────────────────────────────
        "chat.title" => "AnatomAR",
        "chat.subtitle" => if es { "Asistente de anatomía" } else { "Anatomy assistant" },
        "chat.clear" => if es { "Limpiar" } else { "Clear" },
        "chat.clear_tip" => if es { "Borrar la conversación" } else { "Clear the conversation" },
        "chat.close" => if es { "Cerrar" } else { "Close" },
        "chat.ask" => if es { "Escribe tu pregunta…" } else { "Type your question…" },
        "chat.send_tip" => if es { "Enviar (Enter)" } else { "Send (Enter)" },
        "chat.thinking" => if es { "Pensando…" } else { "Thinking…" },
        "chat.open" => if es { "Pregúntale a AnatomAR" } else { "Ask AnatomAR" },

        // ── Settings ────────────────────────────────────────
        "settings.title" => if es { "Ajustes" } else { "Settings" },
        "settings.ui" => if es { "Interfaz" } else { "Interface" },
        "settings.font_size" => if es { "Tamaño de letra" } else { "Font size" },
        "settings.viewer" => if es { "Visor 3D" } else { "3D viewer" },
        "settings.assets_dir" => if es { "Carpeta de modelos" } else { "Models folder" },
        "settings.browse" => if es { "Elegir…" } else { "Browse…" },
        "settings.bg_color" => if es { "Color de fondo" } else { "Background color" },
        "settings.scale" => if es { "Escala del modelo" } else { "Model scale" },
        "settings.damping" => if es { "Amortiguación" } else { "Damping" },
        "settings.rotate_speed" => if es { "Velocidad de giro" } else { "Rotation speed" },
        "settings.chat" => if es { "Asistente" } else { "Assistant" },
        "settings.endpoint" => if es { "Servicio" } else { "Endpoint" },
        "settings.model" => if es { "Modelo" } else { "Model" },
        "settings.api_key" => "API Key",
        "settings.api_key_env" => if es {
            "La variable ANATOMAR_API_KEY tiene prioridad"
        } else {
            "ANATOMAR_API_KEY takes precedence"
        },
        "settings.restart_hint" => if es {
            "Los cambios del visor se aplican al recargar los modelos"
        } else {
            "Viewer changes apply when models reload"
        },
        "settings.apply" => if es { "Guardar" } else { "Save" },
        "settings.reset" => if es { "Restablecer" } else { "Reset" },
        "settings.close" => if es { "Cerrar" } else { "Close" },

        // ── Fallback ────────────────────────────────────────
        _ => "???",
    }
}
