//! Integration tests for the viewport session lifecycle.
//!
//! Drives sessions through the headless harness: tracking surface, manual
//! fetcher and host signals.

use std::time::Duration;

use glam::Vec3;

use anatomar_gui_lib::asset::model::{ModelNode, NodeTransform, PrimitiveRef};
use anatomar_gui_lib::asset::{AssetError, ModelSource};
use anatomar_gui_lib::fixtures;
use anatomar_gui_lib::harness::{
    ManualFetcher, SharedLedger, SurfaceEvent, TrackingSurface, ViewerHarness,
};
use anatomar_gui_lib::viewport::host::HostSignals;
use anatomar_gui_lib::viewport::mesh::Aabb;
use anatomar_gui_lib::viewport::session::{
    LoadStatus, MountError, TickOutcome, ViewportConfig, ViewportSession,
};
use anatomar_gui_lib::viewport::surface::MountRegion;

const FRAME: Duration = Duration::from_millis(16);

/// World-space bounds of the single cube in an `offset_cube_asset` model
fn cube_world_bounds(h: &mut ViewerHarness, size: f32) -> Aabb {
    let model = h.session().scene().model().cloned().unwrap();
    let worlds = model.world_matrices();
    fixtures::cube_mesh(size).bounds().transformed(&worlds[0])
}

// ── Mount ────────────────────────────────────────────────────

#[test]
fn test_mount_requires_layout() {
    let err = ViewerHarness::mount("models/skull.glb", 0, 300).err().unwrap();
    assert!(matches!(err, MountError::NotLaidOut { width: 0, height: 300 }));
}

#[test]
fn test_mount_attaches_and_schedules_first_tick() {
    let mut h = ViewerHarness::mount("models/skull.glb", 640, 480).unwrap();
    {
        let l = h.ledger.borrow();
        assert!(l.attached);
        assert!(l.backing_live);
        assert_eq!(l.backing_size, (640, 480));
    }
    let loop_id = h.session().loop_id();
    assert!(h.host.take_frame_request(loop_id));
    assert_eq!(h.host.resize_subscriber_count(), 1);
}

#[test]
fn test_loop_runs_before_model_arrives() {
    let mut h = ViewerHarness::mount("models/skull.glb", 640, 480).unwrap();
    h.run_frames(5, FRAME);
    assert_eq!(h.ledger.borrow().draw_count, 5);
    assert!(h.session().is_loading());
    let frame = h.ledger.borrow().last_frame.clone().unwrap();
    assert!(frame.items.is_empty());
    assert_eq!(frame.lights.len(), 2);
}

#[test]
fn test_auto_rotate_moves_camera_without_model() {
    let mut h = ViewerHarness::mount("models/skull.glb", 640, 480).unwrap();
    let start = h.session().camera().position;
    h.run_frames(30, FRAME);
    let end = h.session().camera().position;
    assert!((start - end).length() > 1e-4);
    assert!((end.length() - start.length()).abs() < 1e-3);
}

// ── Load ─────────────────────────────────────────────────────

#[test]
fn test_loaded_model_is_centered() {
    for center in [
        Vec3::new(10.0, 0.0, 0.0),
        Vec3::new(-3.5, 42.0, 7.25),
        Vec3::new(0.0, -100.0, 0.001),
    ] {
        let mut h = ViewerHarness::mount("models/skull.glb", 500, 500).unwrap();
        h.load(fixtures::offset_cube_asset(center, 2.0));
        assert_eq!(h.session().status(), LoadStatus::Loaded);

        let bounds = cube_world_bounds(&mut h, 2.0);
        assert!(
            bounds.center().length() < 1e-3,
            "center {:?} for authored origin {center:?}",
            bounds.center()
        );
        // scale 1.5 applied uniformly
        assert!((bounds.max.x - bounds.min.x - 3.0).abs() < 1e-4);
    }
}

#[test]
fn test_hero_preset_keeps_authored_origin() {
    let config = ViewportConfig::hero(ModelSource::parse("models/book_anatomy.glb"));
    let mut h = ViewerHarness::mount_with(config, 800, 600).unwrap();
    h.load(fixtures::offset_cube_asset(Vec3::new(2.0, 0.0, 0.0), 2.0));

    let bounds = cube_world_bounds(&mut h, 2.0);
    assert!((bounds.center() - Vec3::new(3.0, 0.0, 0.0)).length() < 1e-4);
    assert_eq!(h.session().scene().lights().len(), 1);
}

#[test]
fn test_hero_preset_draws_over_page() {
    let config = ViewportConfig::hero(ModelSource::parse("models/book_anatomy.glb"));
    assert_eq!(config.background, None);

    let mut h = ViewerHarness::mount_with(config, 800, 600).unwrap();
    h.load(fixtures::offset_cube_asset(Vec3::ZERO, 1.0));
    h.tick(FRAME);
    assert_eq!(h.ledger.borrow().last_frame.as_ref().unwrap().background, None);

    let mut h = ViewerHarness::mount("models/skull.glb", 640, 480).unwrap();
    h.tick(FRAME);
    assert!(h.ledger.borrow().last_frame.as_ref().unwrap().background.is_some());
}

#[test]
fn test_load_draws_every_part() {
    let mut h = ViewerHarness::mount("models/skull.glb", 640, 480).unwrap();
    h.load(fixtures::multi_part_asset());
    h.tick(FRAME);
    let l = h.ledger.borrow();
    assert_eq!(l.live_geometries.len(), 3);
    assert_eq!(l.live_materials.len(), 2);
    assert_eq!(l.last_frame.as_ref().unwrap().items.len(), 3);
}

#[test]
fn test_failed_load_degrades_to_lights_only() {
    let mut h = ViewerHarness::mount("models/missing.glb", 640, 480).unwrap();
    h.fetcher.resolve_next(Err(AssetError::Empty));
    assert_eq!(h.tick(FRAME), TickOutcome::Drawn);
    assert_eq!(h.session().status(), LoadStatus::Failed);

    h.run_frames(3, FRAME);
    let l = h.ledger.borrow();
    assert_eq!(l.draw_count, 4);
    assert!(l.last_frame.as_ref().unwrap().items.is_empty());
    assert!(l.live_geometries.is_empty());
}

#[test]
fn test_upload_failure_rolls_back() {
    let mut h = ViewerHarness::mount("models/skull.glb", 640, 480).unwrap();
    h.ledger.borrow_mut().fail_geometry_after = Some(2);
    h.load(fixtures::multi_part_asset());

    assert_eq!(h.session().status(), LoadStatus::Failed);
    assert!(h.session().scene().model().is_none());
    let l = h.ledger.borrow();
    assert!(l.live_geometries.is_empty());
    assert!(l.live_materials.is_empty());
    assert!(l.releases_unique());
}

#[test]
fn test_single_fetch_per_session() {
    let mut h = ViewerHarness::mount("models/frontal.glb", 640, 480).unwrap();
    h.run_frames(10, FRAME);
    h.load(fixtures::offset_cube_asset(Vec3::ZERO, 1.0));
    h.run_frames(10, FRAME);
    h.session().handle_resize(MountRegion::new(320, 240));
    h.run_frames(10, FRAME);

    assert_eq!(h.fetcher.fetch_count(), 1);
    assert_eq!(
        h.fetcher.requested_sources(),
        Vec::<ModelSource>::new(),
        "resolved request must not be reissued"
    );
}

#[test]
fn test_new_source_means_new_session() {
    let host = HostSignals::new();
    let fetcher = ManualFetcher::new();
    let region = MountRegion::new(400, 400);

    let first = ViewportConfig::new(ModelSource::parse("models/frontal.glb"), true);
    let second = ViewportConfig::new(ModelSource::parse("models/mandible.glb"), true);
    assert!(!first.same_session(&second));

    let ledger_a = SharedLedger::default();
    let mut a = ViewportSession::mount(
        first,
        region,
        TrackingSurface::new(ledger_a.clone()),
        &fetcher,
        &host,
    )
    .unwrap();
    a.dispose();
    drop(a);
    assert!(ledger_a.borrow().all_released());

    let b = ViewportSession::mount(
        second,
        region,
        TrackingSurface::new(SharedLedger::default()),
        &fetcher,
        &host,
    )
    .unwrap();
    assert!(b.is_alive());
    assert_eq!(fetcher.fetch_count(), 2);
    assert_eq!(host.resize_subscriber_count(), 1);
}

// ── Render loop ──────────────────────────────────────────────

#[test]
fn test_animation_time_equals_sum_of_deltas() {
    let mut h = ViewerHarness::mount("models/skull.glb", 640, 480).unwrap();
    h.load(fixtures::animated_cube_asset(vec![fixtures::slide_clip("open", 2.0, 4.0)]));

    let deltas_ms = [16u64, 17, 33, 8, 100, 16, 16, 250, 1, 16];
    for ms in deltas_ms {
        assert_eq!(h.tick(Duration::from_millis(ms)), TickOutcome::Drawn);
    }
    let expected: f64 = deltas_ms.iter().map(|ms| *ms as f64 / 1000.0).sum();
    let elapsed = h.session().animation().unwrap().elapsed();
    assert!((elapsed - expected).abs() < 1e-9, "{elapsed} vs {expected}");
}

#[test]
fn test_only_first_clip_plays() {
    let mut h = ViewerHarness::mount("models/skull.glb", 640, 480).unwrap();
    h.load(fixtures::animated_cube_asset(vec![
        fixtures::slide_clip("first", 1.0, 2.0),
        fixtures::slide_clip("second", 1.0, -2.0),
    ]));
    h.tick(Duration::from_millis(500));

    let session = h.session();
    assert_eq!(session.animation().unwrap().clip().name.as_deref(), Some("first"));
    let pose = session.scene().model().unwrap().transforms[0];
    assert!((pose.translation.x - 1.0).abs() < 1e-5);
}

#[test]
fn test_each_tick_schedules_one_successor() {
    let mut h = ViewerHarness::mount("models/skull.glb", 640, 480).unwrap();
    assert_eq!(h.tick(FRAME), TickOutcome::Drawn);
    // Each tick schedules exactly one successor
    assert_eq!(h.host.pending_frame_count(), 1);
    assert_eq!(h.ledger.borrow().draw_count, 1);
}

// ── Resize ───────────────────────────────────────────────────

#[test]
fn test_resize_updates_aspect_and_backing() {
    let mut h = ViewerHarness::mount("models/skull.glb", 500, 500).unwrap();
    assert!((h.session().camera().aspect - 1.0).abs() < 1e-6);

    h.session().handle_resize(MountRegion::new(800, 400));
    assert!((h.session().camera().aspect - 2.0).abs() < 1e-6);
    assert_eq!(h.ledger.borrow().backing_size, (800, 400));
    assert_eq!(h.session().region(), MountRegion::new(800, 400));
}

#[test]
fn test_zero_resize_ignored() {
    let mut h = ViewerHarness::mount("models/skull.glb", 500, 500).unwrap();
    h.session().handle_resize(MountRegion::new(0, 0));
    assert_eq!(h.ledger.borrow().backing_size, (500, 500));
}

// ── Disposal ─────────────────────────────────────────────────

#[test]
fn test_dispose_releases_everything() {
    let mut h = ViewerHarness::mount("models/skull.glb", 640, 480).unwrap();
    h.load(fixtures::multi_part_asset());
    h.run_frames(3, FRAME);
    let loop_id = h.session().loop_id();
    h.unmount();

    let l = h.ledger.borrow();
    assert!(l.all_released());
    assert!(l.releases_unique());
    assert_eq!(l.geometry_releases.len(), 3);
    assert_eq!(l.material_releases.len(), 2);
    assert!(!l.attached);
    assert_eq!(l.dispose_calls, 1);
    assert_eq!(l.detach_calls, 1);
    assert!(!h.host.take_frame_request(loop_id));
    assert_eq!(h.host.resize_subscriber_count(), 0);
}

#[test]
fn test_dispose_tears_down_in_order() {
    let mut h = ViewerHarness::mount("models/skull.glb", 640, 480).unwrap();
    h.load(fixtures::multi_part_asset());
    h.run_frames(2, FRAME);
    assert!(h.host.pending_frame_count() > 0);
    assert!(!h.session().controls_disposed());

    h.session().dispose();
    assert!(h.session().controls_disposed());

    let l = h.ledger.borrow();
    assert_eq!(l.events.first(), Some(&SurfaceEvent::Attach));
    assert_eq!(l.events.last(), Some(&SurfaceEvent::Detach));

    // Frame loop and resize subscription are gone before the surface goes
    let dispose_at = l
        .events
        .iter()
        .position(|e| matches!(e, SurfaceEvent::Dispose { .. }))
        .unwrap();
    assert_eq!(
        l.events[dispose_at],
        SurfaceEvent::Dispose {
            frame_requested: false,
            resize_subscribers: 0,
        }
    );

    // Model resources are released after the surface and before detaching
    let releases: Vec<usize> = l
        .events
        .iter()
        .enumerate()
        .filter(|(_, e)| {
            matches!(e, SurfaceEvent::ReleaseGeometry(_) | SurfaceEvent::ReleaseMaterial(_))
        })
        .map(|(i, _)| i)
        .collect();
    assert_eq!(releases.len(), 5);
    assert!(releases.iter().all(|&i| i > dispose_at && i < l.events.len() - 1));
}

#[test]
fn test_nodes_outside_scene_are_never_uploaded() {
    let mut asset = fixtures::offset_cube_asset(Vec3::ZERO, 1.0);
    asset.meshes.push(fixtures::cube_mesh(2.0));
    let mut stray = ModelNode::new(NodeTransform::IDENTITY);
    stray.primitives.push(PrimitiveRef { mesh: 1, material: 0 });
    asset.nodes.push(stray);

    let mut h = ViewerHarness::mount("models/skull.glb", 640, 480).unwrap();
    h.load(asset);
    h.tick(FRAME);
    {
        let l = h.ledger.borrow();
        assert_eq!(l.geometry_uploads, 1);
        assert_eq!(l.last_frame.as_ref().unwrap().items.len(), 1);
    }

    h.unmount();
    let l = h.ledger.borrow();
    assert!(l.all_released());
    assert!(l.releases_unique());
}

#[test]
fn test_dispose_before_load_completes() {
    let mut h = ViewerHarness::mount("models/skull.glb", 640, 480).unwrap();
    h.run_frames(2, FRAME);
    h.unmount();

    let l = h.ledger.borrow();
    assert!(l.all_released());
    assert!(l.geometry_releases.is_empty());
    assert_eq!(l.dispose_calls, 1);
}

#[test]
fn test_dispose_is_idempotent() {
    let mut h = ViewerHarness::mount("models/skull.glb", 640, 480).unwrap();
    h.load(fixtures::offset_cube_asset(Vec3::ZERO, 1.0));
    h.session().dispose();
    h.session().dispose();
    h.unmount();

    let l = h.ledger.borrow();
    assert_eq!(l.dispose_calls, 1);
    assert_eq!(l.geometry_releases.len(), 1);
    assert!(l.releases_unique());
}

#[test]
fn test_drop_disposes() {
    let mut h = ViewerHarness::mount("models/skull.glb", 640, 480).unwrap();
    h.load(fixtures::offset_cube_asset(Vec3::ZERO, 1.0));
    h.session = None;
    assert!(h.ledger.borrow().all_released());
    assert_eq!(h.host.resize_subscriber_count(), 0);
}

#[test]
fn test_late_load_after_dispose_is_dropped() {
    let mut h = ViewerHarness::mount("models/skull.glb", 640, 480).unwrap();
    let liveness = h.fetcher.next_liveness().unwrap();
    assert!(liveness.is_alive());

    h.session().dispose();
    assert!(!liveness.is_alive());

    // Delivery may or may not find a receiver; either way nothing is attached
    h.fetcher.resolve_next(Ok(fixtures::multi_part_asset()));
    assert_eq!(h.tick(FRAME), TickOutcome::Stopped);
    h.session().poll_load();

    let uploads = h.ledger.borrow().geometry_uploads;
    assert_eq!(uploads, 0);
    assert!(h.session().scene().model().is_none());
}

#[test]
fn test_completion_on_disposed_session_is_ignored() {
    let mut h = ViewerHarness::mount("models/skull.glb", 640, 480).unwrap();
    h.session().dispose();
    h.session().complete_load(Ok(fixtures::multi_part_asset()));

    assert_eq!(h.session().status(), LoadStatus::Discarded);
    let l = h.ledger.borrow();
    assert_eq!(l.geometry_uploads, 0);
    assert_eq!(l.material_uploads, 0);
}

#[test]
fn test_tick_after_dispose_touches_nothing() {
    let mut h = ViewerHarness::mount("models/skull.glb", 640, 480).unwrap();
    h.run_frames(2, FRAME);
    h.session().dispose();
    assert_eq!(h.session().tick(FRAME), TickOutcome::Stopped);
    assert_eq!(h.ledger.borrow().draw_count, 2);
    assert_eq!(h.host.pending_frame_count(), 0);
}
