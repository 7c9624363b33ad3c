//! Top-level play-simulation facade: owns the ECS world, the spatial
//! index, the tick scheduler and the player roster, and exposes the
//! handful of calls a frame driver needs (`spawn_mobj`, `set_input`,
//! `pump`) without requiring callers to know how those pieces fit
//! together.

use std::collections::HashMap;

use glam::{Vec2, Vec3};
use hecs::{Entity, World};
use smallvec::SmallVec;

use super::components::{ActorFlags, Angle, Health, PlayerBody, Position, Velocity};
use super::mobj::{SpatialIndex, run_remove_queue, spawn_mobj, stale_ref_sweep};
use super::movement::xy_movement_system;
use super::player::Player;
use super::rng::Rng;
use super::scheduler::{MAX_PLAYERS, TickScheduler};
use super::sector_fx::sector_damage_system;
use super::sound::{SoundQueue, SoundSink};
use super::ticcmd::{ButtonFlags, Ticcmd};
use super::weapon::{AmmoKind, WEAPON_TABLE, WeaponState};
use super::zmovement::z_movement_system;
use crate::defs::MobjInfo;
use crate::defs::flags::MobjFlags;
use crate::defs::sound::Sound;
use crate::specials::SpecialsState;
use crate::world::{Level, LinedefId};

pub struct Sim {
    world: World,
    spatial: SpatialIndex,
    scheduler: TickScheduler,
    rng: Rng,
    sounds: SoundQueue,
    sound_sink: SoundSink,
    players: Vec<Player>,
    pending: [Ticcmd; MAX_PLAYERS],
    specials: SpecialsState,
    damage_cooldowns: HashMap<Entity, i32>,
}

impl Sim {
    pub fn new(level: &Level) -> Self {
        Self::with_scheduler(level, TickScheduler::new())
    }

    /// A `Sim` whose tick scheduler runs in `singletics` mode: `pump`
    /// advances exactly one tic per call regardless of wall-clock time.
    /// Used for deterministic replay and save/load round-trip tests,
    /// where the test drives the exact tic count.
    pub fn new_singletics(level: &Level) -> Self {
        Self::with_scheduler(level, TickScheduler::singletics())
    }

    fn with_scheduler(level: &Level, scheduler: TickScheduler) -> Self {
        let origin = level
            .blockmap
            .as_ref()
            .map(|b| b.origin)
            .unwrap_or(Vec2::ZERO);
        let (sounds, sound_sink) = SoundQueue::new();
        Self {
            world: World::new(),
            spatial: SpatialIndex::new(origin),
            scheduler,
            rng: Rng::new(0),
            sounds,
            sound_sink,
            players: Vec::new(),
            pending: [Ticcmd::default(); MAX_PLAYERS],
            specials: SpecialsState::new(level),
            damage_cooldowns: HashMap::new(),
        }
    }

    pub fn specials(&self) -> &SpecialsState {
        &self.specials
    }

    /// Current `gametic` — the tic the simulation has actually run through.
    pub fn gametic(&self) -> u32 {
        self.scheduler.gametic()
    }

    /// `N_ResetTics` equivalent at the `Sim` level: rewinds the scheduler
    /// to tic zero, used when restoring a save (the save file's own
    /// `gametic` is tracked separately in `GlobRecord`, not by the live
    /// scheduler).
    pub fn reset_scheduler(&mut self) {
        self.scheduler.reset();
    }

    /// Force the RNG to a known seed, as a deterministic-replay harness
    /// does before feeding it a recorded ticcmd sequence.
    pub fn seed_rng(&mut self, seed: u32) {
        self.rng = Rng::new(seed);
    }

    /// `P_UseLines`: activate the switch/door special (if any) tagged on
    /// `line` on behalf of `player_idx`'s body.
    pub fn use_line(&mut self, level: &mut Level, line: LinedefId) -> bool {
        self.specials.use_line(level, line, true)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn sound_sink(&mut self) -> &mut SoundSink {
        &mut self.sound_sink
    }

    pub fn rng(&mut self) -> &mut Rng {
        &mut self.rng
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn players_mut(&mut self) -> &mut [Player] {
        &mut self.players
    }

    /// `P_SpawnMobj`, on the side the frame driver talks to: the z is
    /// always derived from the destination sector/flags.
    pub fn spawn_mobj(
        &mut self,
        level: &Level,
        info: &'static MobjInfo,
        x: f32,
        y: f32,
        angle: f32,
    ) -> Entity {
        spawn_mobj(&mut self.world, &mut self.spatial, level, info, x, y, None, angle)
    }

    /// Spawn the live body for player slot `player_idx` and mark it local
    /// (i.e. its `Ticcmd`s come from `set_input`, not the network).
    pub fn spawn_player(&mut self, level: &Level, player_idx: usize, x: f32, y: f32, angle: f32) -> Entity {
        let info = crate::defs::by_id("PLAYER").expect("PLAYER entry missing from MOBJINFO");
        let ent = self.spawn_mobj(level, info, x, y, angle);
        let _ = self.world.insert_one(ent, PlayerBody(player_idx));

        while self.players.len() <= player_idx {
            self.players.push(Player::new());
        }
        self.players[player_idx].body = Some(ent);
        self.scheduler.set_local_player(player_idx, true);
        ent
    }

    /// Latch the next `Ticcmd` a local player will contribute the next
    /// time `pump` samples input.
    pub fn set_input(&mut self, player_idx: usize, cmd: Ticcmd) {
        if player_idx < self.pending.len() {
            self.pending[player_idx] = cmd;
        }
    }

    /// Advance however many 35Hz tics real time has accumulated since the
    /// last call (`BuildTiccmds` + `TryRunTics` + `GrabTiccmds`, run for
    /// each tic owed).
    pub fn pump(&mut self, level: &mut Level) {
        let pending = self.pending;
        self.scheduler.build_ticcmd(|idx| pending[idx]);

        let owed = self.scheduler.try_run_tics();
        for _ in 0..owed {
            self.run_one_tic(level);
        }
    }

    fn run_one_tic(&mut self, level: &mut Level) {
        let cmds = self.scheduler.grab_ticcmds();
        for (idx, player) in self.players.iter_mut().enumerate() {
            player.cmd = cmds[idx];
            player.think();
            if let Some(body) = player.body {
                apply_player_cmd(&mut self.world, body, player.angle.to_radians(), &player.cmd);
                let fire = tick_weapon(player, &mut self.world, body, level, &self.sounds, &mut self.rng);
                if let FireEffect::Rocket { origin, angle } = fire {
                    spawn_rocket(&mut self.world, &mut self.spatial, level, origin, angle);
                }
            }
        }

        self.specials.tick(level);

        let mut crossed: SmallVec<[(Entity, LinedefId); 4]> = SmallVec::new();
        xy_movement_system(
            &mut self.world,
            &mut self.spatial.thing_grid,
            level,
            |entity, line| crossed.push((entity, line)),
        );
        for (entity, line) in crossed {
            let is_player = self.world.get::<&PlayerBody>(entity).is_ok();
            self.specials.cross_line(level, line, is_player);
        }

        z_movement_system(&mut self.world, level, &self.sounds);
        sector_damage_system(&mut self.world, level, &mut self.damage_cooldowns);
        stale_ref_sweep(&mut self.world);
        run_remove_queue(&mut self.world, &mut self.spatial);
    }
}

/// Drive a player body's `Angle`/`Velocity` from its latest `Ticcmd`,
/// after `Player::think` has already folded `angle_turn` into the
/// player's own `Bam` heading.
fn apply_player_cmd(world: &mut World, ent: Entity, facing: f32, cmd: &Ticcmd) {
    if let Ok(mut angle) = world.get::<&mut Angle>(ent) {
        angle.0 = facing;
    }

    let forward_speed = 8.0;
    let strafe_speed = 6.0;
    let fwd = Vec2::new(facing.cos(), facing.sin());
    let right = Vec2::new(-facing.sin(), facing.cos());
    let move_vec = fwd * (cmd.forward as f32 / 100.0) * forward_speed
        + right * (cmd.side as f32 / 100.0) * strafe_speed;

    if let Ok(mut vel) = world.get::<&mut Velocity>(ent) {
        vel.0.x = move_vec.x;
        vel.0.y = move_vec.y;
    }
}

/// What firing the ready weapon did this tic, for the caller to act on —
/// `tick_weapon` itself doesn't own the spatial index a projectile spawn
/// needs, so it hands the spawn request back up to `Sim`.
enum FireEffect {
    None,
    Rocket { origin: Vec2, angle: f32 },
}

fn ammo_index(kind: AmmoKind) -> Option<usize> {
    match kind {
        AmmoKind::Bullets => Some(0),
        AmmoKind::Shells => Some(1),
        AmmoKind::Cells => Some(2),
        AmmoKind::Rockets => Some(3),
        AmmoKind::None => None,
    }
}

fn fire_sound(slot: u8) -> Sound {
    match slot {
        1 => Sound::Pistol,
        2 => Sound::Shotgn,
        4 => Sound::Rlaunc,
        _ => Sound::Pistol,
    }
}

/// `P_MovePsprites` + `A_WeaponReady`/`A_FireWeapon`, collapsed: advance any
/// in-flight weapon switch, and if the ready weapon is fully up and the
/// attack button is held, spend its ammo and report what it fired.
fn tick_weapon(
    player: &mut Player,
    world: &mut World,
    body: Entity,
    level: &Level,
    sounds: &SoundQueue,
    rng: &mut Rng,
) -> FireEffect {
    if let WeaponState::Slot(pending) = player.pending_weapon {
        let from = player.ready_weapon.slot().unwrap_or(0) as usize;
        let to = pending as usize;
        if player.weapon_rig.transition.is_none() {
            player.weapon_rig.begin_switch(&WEAPON_TABLE[from]);
        }
        if player.weapon_rig.tick(&WEAPON_TABLE[to]) {
            player.ready_weapon = player.pending_weapon;
            player.pending_weapon = WeaponState::NoChange;
        }
        return FireEffect::None;
    }

    let Some(slot) = player.ready_weapon.slot() else {
        return FireEffect::None;
    };
    if !player.attack_down || player.weapon_rig.transition.is_some() {
        return FireEffect::None;
    }

    let info = &WEAPON_TABLE[slot as usize];
    if let Some(idx) = ammo_index(info.ammo) {
        if !player.ammo[idx].spend(info.per_shot) {
            return FireEffect::None;
        }
    }

    let Ok(pos) = world.get::<&Position>(body) else {
        return FireEffect::None;
    };
    let origin = pos.0;
    let angle = world.get::<&Angle>(body).map(|a| a.0).unwrap_or(0.0);
    sounds.start(fire_sound(slot), origin, 1.0);

    if info.ammo == AmmoKind::Rockets {
        FireEffect::Rocket { origin, angle }
    } else {
        hitscan_attack(world, level, origin, angle, rng);
        FireEffect::None
    }
}

/// A forward hitscan with no pre-assigned target: scan shootable mobjs
/// within a narrow cone of `facing`, pick the nearest one with a clear
/// sightline, and apply `A_PosAttack`'s damage roll to it.
fn hitscan_attack(world: &mut World, level: &Level, origin: Vec2, facing: f32, rng: &mut Rng) {
    const CONE: f32 = 0.15;
    const RANGE: f32 = 2048.0;

    let mut best: Option<(Entity, f32)> = None;
    for (ent, (pos, flags)) in world.query::<(&Position, &ActorFlags)>().iter() {
        if !flags.0.contains(MobjFlags::SHOOTABLE) {
            continue;
        }
        let delta = pos.0 - origin;
        let dist = delta.length();
        if dist < 1.0 || dist > RANGE {
            continue;
        }
        let angle_to = delta.y.atan2(delta.x);
        let mut diff = angle_to - facing;
        while diff > std::f32::consts::PI {
            diff -= std::f32::consts::TAU;
        }
        while diff < -std::f32::consts::PI {
            diff += std::f32::consts::TAU;
        }
        if diff.abs() > CONE {
            continue;
        }
        if best.is_none_or(|(_, d)| dist < d) {
            best = Some((ent, dist));
        }
    }

    let Some((target, _)) = best else { return };
    let target_pos = world.get::<&Position>(target).unwrap().0;
    if !level.sight_check((origin, 32.0), (target_pos, 32.0)) {
        return;
    }
    if let Ok(mut health) = world.get::<&mut Health>(target) {
        health.0 -= 3 + (rng.below(4) as i32);
    }
}

fn spawn_rocket(world: &mut World, spatial: &mut SpatialIndex, level: &Level, origin: Vec2, angle: f32) {
    let Some(info) = crate::defs::by_id("ROCKET") else {
        return;
    };
    let dir = Vec2::new(angle.cos(), angle.sin());
    let spawn_pos = origin + dir * 20.0;
    let ent = spawn_mobj(world, spatial, level, info, spawn_pos.x, spawn_pos.y, None, angle);
    let speed = info.speed as f32 * 16.0;
    let _ = world.insert_one(ent, Velocity(Vec3::new(dir.x * speed, dir.y * speed, 0.0)));
}

/// Bridge a raw per-frame input snapshot into the `Ticcmd` the scheduler
/// expects to sample; used by interactive frontends that read keyboard
/// state directly rather than speaking the loopback wire protocol.
pub fn ticcmd_from_input(
    forward: f32,
    strafe: f32,
    turn: f32,
    fire: bool,
    use_act: bool,
    weapon: Option<u8>,
) -> Ticcmd {
    let mut buttons = ButtonFlags::empty();
    if fire {
        buttons |= ButtonFlags::ATTACK;
    }
    if use_act {
        buttons |= ButtonFlags::USE;
    }

    let mut cmd = Ticcmd {
        angle_turn: (turn.clamp(-1.0, 1.0) * 4000.0) as i16,
        forward: (forward.clamp(-1.0, 1.0) * 100.0) as i8,
        side: (strafe.clamp(-1.0, 1.0) * 100.0) as i8,
        buttons,
        ..Ticcmd::default()
    };
    if let Some(slot) = weapon {
        cmd.buttons |= ButtonFlags::CHANGE_WEAPON;
        cmd.set_weapon_slot(slot);
    }
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::geometry::{Level as GeomLevel, Sector, Subsector};

    fn flat_level() -> GeomLevel {
        GeomLevel {
            name: "TEST".into(),
            things: vec![],
            linedefs: vec![],
            sidedefs: vec![],
            vertices: vec![],
            segs: vec![],
            subsectors: vec![Subsector {
                seg_count: 0,
                first_seg: 0,
                sector: 0,
                things: vec![],
            }],
            nodes: vec![],
            sectors: vec![Sector {
                id: 0,
                floor_h: 0.0,
                ceil_h: 128.0,
                floor_tex: 0,
                ceil_tex: 0,
                light: 160.0,
                special: 0,
                tag: 0,
                ext_flags: Default::default(),
                lines: vec![],
                extrafloors: vec![],
                floor_slope: None,
                ceil_slope: None,
            }],
            blockmap: None,
            reject: None,
        }
    }

    #[test]
    fn spawn_player_registers_body_and_local_slot() {
        let level = flat_level();
        let mut sim = Sim::new(&level);
        let ent = sim.spawn_player(&level, 0, 0.0, 0.0, 0.0);
        assert!(sim.world().get::<&PlayerBody>(ent).is_ok());
        assert_eq!(sim.players().len(), 1);
        assert_eq!(sim.players()[0].body, Some(ent));
    }

    #[test]
    fn ticcmd_from_input_round_trips_forward_and_turn() {
        let cmd = ticcmd_from_input(1.0, -0.5, 0.25, true, false, None);
        assert_eq!(cmd.forward, 100);
        assert_eq!(cmd.side, -50);
        assert!(cmd.angle_turn > 0);
        assert!(cmd.buttons.contains(ButtonFlags::ATTACK));
    }

    #[test]
    fn pump_advances_player_after_enough_real_time() {
        let mut level = flat_level();
        let mut sim = Sim::new(&level);
        sim.spawn_player(&level, 0, 0.0, 0.0, 0.0);
        sim.set_input(0, ticcmd_from_input(1.0, 0.0, 0.0, false, false, None));
        std::thread::sleep(std::time::Duration::from_millis(60));
        sim.pump(&mut level);
        // at least one tic should have run and nudged the body off zero.
        let ent = sim.players()[0].body.unwrap();
        let vel = *sim.world().get::<&Velocity>(ent).unwrap();
        assert!(vel.0.x != 0.0 || vel.0.y != 0.0);
    }

    #[test]
    fn weapon_switch_sequence_completes_and_latches() {
        let level = flat_level();
        let mut world = World::new();
        let body = world.spawn((Position(Vec2::ZERO, 0.0), Angle(0.0)));
        let mut player = Player::new();
        player.ready_weapon = WeaponState::Slot(0);
        player.pending_weapon = WeaponState::Slot(1);
        let (sounds, _sink) = SoundQueue::new();
        let mut rng = Rng::new(0);

        let mut ticks = 0;
        while player.pending_weapon != WeaponState::NoChange && ticks < 64 {
            tick_weapon(&mut player, &mut world, body, &level, &sounds, &mut rng);
            ticks += 1;
        }
        assert_eq!(player.ready_weapon, WeaponState::Slot(1));
        assert!(player.weapon_rig.transition.is_none());
    }

    #[test]
    fn fist_attack_damages_shootable_target_in_cone() {
        let mut level = flat_level();
        let mut sim = Sim::new_singletics(&level);
        sim.spawn_player(&level, 0, 0.0, 0.0, 0.0);
        let trooper = crate::defs::by_id("TROOPER").unwrap();
        let target = sim.spawn_mobj(&level, trooper, 50.0, 0.0, 0.0);
        sim.players_mut()[0].ready_weapon = WeaponState::Slot(0);
        let before = sim.world().get::<&Health>(target).unwrap().0;

        sim.set_input(0, ticcmd_from_input(0.0, 0.0, 0.0, true, false, None));
        sim.pump(&mut level);

        let after = sim.world().get::<&Health>(target).unwrap().0;
        assert!(after < before);
    }

    #[test]
    fn fist_attack_withholds_fire_without_attack_button() {
        let mut level = flat_level();
        let mut sim = Sim::new_singletics(&level);
        sim.spawn_player(&level, 0, 0.0, 0.0, 0.0);
        let trooper = crate::defs::by_id("TROOPER").unwrap();
        let target = sim.spawn_mobj(&level, trooper, 50.0, 0.0, 0.0);
        sim.players_mut()[0].ready_weapon = WeaponState::Slot(0);
        let before = sim.world().get::<&Health>(target).unwrap().0;

        sim.set_input(0, ticcmd_from_input(0.0, 0.0, 0.0, false, false, None));
        sim.pump(&mut level);

        let after = sim.world().get::<&Health>(target).unwrap().0;
        assert_eq!(after, before);
    }
}
