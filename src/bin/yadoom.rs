//! Command-line frontend: parses CLI flags, loads/saves `yadoom.cfg`,
//! initializes `tracing`, and drives an [`yadoom_rs::engine::Engine`]
//! through a minifb window. This is the "real" entry point; `view_sw`
//! stays a lighter harness that drives [`yadoom_rs::sim::Sim`] directly
//! for renderer work that doesn't need sound or save/load.

use std::time::Duration;

use clap::Parser;
use minifb::{Key, KeyRepeat, Window, WindowOptions};

use yadoom_rs::config::{Cli, Config};
use yadoom_rs::engine::Engine;
use yadoom_rs::renderer::{software::Software, Renderer};
use yadoom_rs::sim::ticcmd_from_input;
use yadoom_rs::wad::{load_level, Wad};
use yadoom_rs::world::{Camera, SegmentId, SubsectorId, TextureBank};

const PLAYER_HEIGHT: f32 = 41.0;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut config = Config::load(&cli.config).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        Config::default()
    });
    cli.apply(&mut config);

    let iwad_path = config
        .iwad
        .clone()
        .ok_or_else(|| anyhow::anyhow!("no IWAD given (use --iwad or set it in {:?})", cli.config))?;
    let wad = Wad::from_file(&iwad_path)?;

    let mut texture_bank = TextureBank::default_with_checker();
    let marker = match &config.warp_map {
        Some(name) => wad
            .find_lump(name)
            .ok_or_else(|| anyhow::anyhow!("map {name:?} not found in IWAD"))?,
        None => wad.level_indices()[0],
    };
    let mut level = load_level(&wad, marker, &mut texture_bank)?;
    level.finalise_bsp();
    tracing::info!(map = %level.name, skill = config.skill, "loaded level");

    let screen_width = config.screen_width as usize;
    let screen_height = config.screen_height as usize;

    let singletics = cli.singletics;
    let mut engine = if singletics {
        Engine::new_singletics(level, config)
    } else {
        Engine::new(level, config)
    };

    for thing in &engine.level.things {
        if thing.type_id == 1 {
            continue;
        }
        if let Some(info) = yadoom_rs::defs::by_doomednum(thing.type_id) {
            engine
                .sim
                .spawn_mobj(&engine.level, info, thing.pos.x, thing.pos.y, thing.angle);
        }
    }

    let player_thing = engine
        .level
        .things
        .iter()
        .find(|t| t.type_id == 1)
        .ok_or_else(|| anyhow::anyhow!("no player start in map"))?;
    let (start_x, start_y, start_angle) = (
        player_thing.pos.x,
        player_thing.pos.y,
        player_thing.angle,
    );
    engine.sim.spawn_player(&engine.level, 0, start_x, start_y, start_angle);

    let mut camera = Camera::new(
        glam::Vec2::new(start_x, start_y).extend(PLAYER_HEIGHT),
        start_angle,
        90_f32.to_radians(),
    );

    let mut renderer = Software::default();
    let mut win = Window::new("yadoom", screen_width, screen_height, WindowOptions::default())?;
    win.set_target_fps(35);

    let mut active_subsectors: Vec<SubsectorId> = Vec::new();
    let mut active_segments: Vec<SegmentId> = Vec::new();
    let mut audio_scratch = vec![0i16; 2 * 1024];

    while win.is_open() && !win.is_key_down(Key::Escape) {
        let mut forward = 0.0f32;
        let mut strafe = 0.0f32;
        let mut turn = 0.0f32;

        if win.is_key_down(Key::Up) || win.is_key_down(Key::W) {
            forward += 1.0;
        }
        if win.is_key_down(Key::Down) || win.is_key_down(Key::S) {
            forward -= 1.0;
        }
        if win.is_key_down(Key::Left) {
            turn += 1.0;
        }
        if win.is_key_down(Key::Right) {
            turn -= 1.0;
        }
        if win.is_key_down(Key::A) {
            strafe -= 1.0;
        }
        if win.is_key_down(Key::D) {
            strafe += 1.0;
        }

        let fire = win.is_key_down(Key::LeftCtrl) || win.is_key_down(Key::RightCtrl);
        let use_act = win.is_key_pressed(Key::Space, KeyRepeat::No);

        engine
            .sim
            .set_input(0, ticcmd_from_input(forward, strafe, turn, fire, use_act, None));
        engine.frame();
        engine.render_audio(&mut audio_scratch);

        if win.is_key_pressed(Key::F5, KeyRepeat::No) {
            if let Err(e) = engine.save_game("quicksave.ysv") {
                tracing::warn!(error = %e, "quicksave failed");
            }
        }
        if win.is_key_pressed(Key::F9, KeyRepeat::No) {
            if let Err(e) = engine.load_game("quicksave.ysv") {
                tracing::warn!(error = %e, "quickload failed");
            }
        }

        if let Some(body) = engine.sim.players()[0].body {
            if let Ok(mut q) = engine
                .sim
                .world()
                .query_one::<(&yadoom_rs::sim::Position, &yadoom_rs::sim::Angle)>(body)
            {
                if let Some((pos, ang)) = q.get() {
                    camera.pos.x = pos.0.x;
                    camera.pos.y = pos.0.y;
                    camera.pos.z = pos.1 + PLAYER_HEIGHT;
                    camera.yaw = ang.0;
                }
            }
        }

        renderer.begin_frame(screen_width, screen_height);
        engine
            .level
            .fill_active_subsectors(&camera, &mut active_subsectors);

        active_segments.clear();
        for &ss in &active_subsectors {
            let sub = &engine.level.subsectors[ss as usize];
            for i in 0..sub.seg_count {
                active_segments.push(sub.first_seg + i);
            }
        }

        renderer.draw_segments(&active_segments, &engine.level, &camera, &texture_bank);
        renderer.draw_things(&active_subsectors, &engine.level, &camera, &texture_bank);
        renderer.end_frame(|fb, w, h| win.update_with_buffer(fb, w, h).unwrap());

        if !singletics {
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    engine.config.save(&cli.config).ok();
    Ok(())
}
