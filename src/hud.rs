//! HUD/script bridge: the single-threaded drawing API a scripting VM
//! would call into each frame, plus the read-only query surface it uses
//! to ask about player/map state. This module never touches a real
//! display — it only records primitives into a queue the frame driver's
//! renderer drains, and answers queries by reading the sim's [`Player`].

use std::collections::HashSet;

use crate::sim::Player;

/// Virtual drawing surface width/height every primitive's coordinates are
/// expressed against; the frame driver scales to the real backbuffer.
pub const VIRT_WIDTH: f32 = 320.0;
pub const VIRT_HEIGHT: f32 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Neg,
    Zero,
    Pos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba(pub u8, pub u8, pub u8, pub u8);

/// One queued drawing primitive. The queue is drained and replayed by
/// whatever renderer owns the actual backbuffer; this module never
/// touches pixels.
#[derive(Debug, Clone)]
pub enum DrawCmd {
    SolidBox {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Rgba,
    },
    SolidLine {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        color: Rgba,
    },
    ThinBox {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Rgba,
    },
    GradientBox {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        corners: [Rgba; 4],
    },
    DrawImage {
        name: String,
        x: f32,
        y: f32,
    },
    StretchImage {
        name: String,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
    },
    ScrollImage {
        name: String,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        u_off: f32,
        v_off: f32,
    },
    TileImage {
        name: String,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
    },
    DrawText {
        text: String,
        x: f32,
        y: f32,
        font: String,
        color: Rgba,
        scale: f32,
        alpha: f32,
        align_x: Align,
        align_y: Align,
    },
    DrawNum {
        value: i32,
        x: f32,
        y: f32,
        field_width: u32,
        zero_pad: bool,
        color: Rgba,
    },
    RenderWorld {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        player: usize,
    },
    RenderAutomap {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        focus: usize,
    },
}

/// Per-call text/drawing state carried between primitive calls, the way
/// a script leaves the font/color/alignment set until it changes them
/// again rather than passing them on every call.
#[derive(Debug, Clone)]
struct TextState {
    font: String,
    color: Rgba,
    scale: f32,
    alpha: f32,
    align_x: Align,
    align_y: Align,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font: "small".into(),
            color: Rgba(255, 255, 255, 255),
            scale: 1.0,
            alpha: 1.0,
            align_x: Align::Neg,
            align_y: Align::Neg,
        }
    }
}

pub struct HudState {
    text: TextState,
    queue: Vec<DrawCmd>,
    enabled_tags: HashSet<String>,
}

impl Default for HudState {
    fn default() -> Self {
        Self::new()
    }
}

impl HudState {
    pub fn new() -> Self {
        Self {
            text: TextState::default(),
            queue: Vec::new(),
            enabled_tags: HashSet::new(),
        }
    }

    pub fn set_font(&mut self, font: impl Into<String>) {
        self.text.font = font.into();
    }

    pub fn set_color(&mut self, color: Rgba) {
        self.text.color = color;
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.text.scale = scale;
    }

    pub fn set_alpha(&mut self, alpha: f32) {
        self.text.alpha = alpha.clamp(0.0, 1.0);
    }

    pub fn set_alignment(&mut self, x: Align, y: Align) {
        self.text.align_x = x;
        self.text.align_y = y;
    }

    pub fn solid_box(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
        self.queue.push(DrawCmd::SolidBox { x, y, w, h, color });
    }

    pub fn solid_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, color: Rgba) {
        self.queue.push(DrawCmd::SolidLine { x1, y1, x2, y2, color });
    }

    pub fn thin_box(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
        self.queue.push(DrawCmd::ThinBox { x, y, w, h, color });
    }

    pub fn gradient_box(&mut self, x: f32, y: f32, w: f32, h: f32, corners: [Rgba; 4]) {
        self.queue.push(DrawCmd::GradientBox { x, y, w, h, corners });
    }

    pub fn draw_image(&mut self, name: impl Into<String>, x: f32, y: f32) {
        self.queue.push(DrawCmd::DrawImage { name: name.into(), x, y });
    }

    pub fn stretch_image(&mut self, name: impl Into<String>, x: f32, y: f32, w: f32, h: f32) {
        self.queue.push(DrawCmd::StretchImage { name: name.into(), x, y, w, h });
    }

    pub fn scroll_image(&mut self, name: impl Into<String>, x: f32, y: f32, w: f32, h: f32, u_off: f32, v_off: f32) {
        self.queue.push(DrawCmd::ScrollImage { name: name.into(), x, y, w, h, u_off, v_off });
    }

    pub fn tile_image(&mut self, name: impl Into<String>, x: f32, y: f32, w: f32, h: f32) {
        self.queue.push(DrawCmd::TileImage { name: name.into(), x, y, w, h });
    }

    pub fn draw_text(&mut self, text: impl Into<String>, x: f32, y: f32) {
        self.queue.push(DrawCmd::DrawText {
            text: text.into(),
            x,
            y,
            font: self.text.font.clone(),
            color: self.text.color,
            scale: self.text.scale,
            alpha: self.text.alpha,
            align_x: self.text.align_x,
            align_y: self.text.align_y,
        });
    }

    pub fn draw_num(&mut self, value: i32, x: f32, y: f32, field_width: u32, zero_pad: bool) {
        self.queue.push(DrawCmd::DrawNum {
            value,
            x,
            y,
            field_width,
            zero_pad,
            color: self.text.color,
        });
    }

    pub fn render_world(&mut self, x: f32, y: f32, w: f32, h: f32, player: usize) {
        self.queue.push(DrawCmd::RenderWorld { x, y, w, h, player });
    }

    pub fn render_automap(&mut self, x: f32, y: f32, w: f32, h: f32, focus: usize) {
        self.queue.push(DrawCmd::RenderAutomap { x, y, w, h, focus });
    }

    /// Drain this frame's queued primitives for the renderer to replay.
    pub fn take_commands(&mut self) -> Vec<DrawCmd> {
        std::mem::take(&mut self.queue)
    }

    pub fn enable_tag(&mut self, tag: impl Into<String>) {
        self.enabled_tags.insert(tag.into());
    }

    pub fn disable_tag(&mut self, tag: &str) {
        self.enabled_tags.remove(tag);
    }

    pub fn is_tag_active(&self, tag: &str) -> bool {
        self.enabled_tags.contains(tag)
    }
}

/// Scale factors from the virtual 320x200 drawing surface to a real
/// `w`x`h` backbuffer, for whatever renderer replays the queue.
pub fn virtual_scale(w: u32, h: u32) -> (f32, f32) {
    (w as f32 / VIRT_WIDTH, h as f32 / VIRT_HEIGHT)
}

/// Snapshot of player state a script's query API reads each frame —
/// ammo/armor/keys/powers/weapon/damage-flash, the fields a status bar
/// or script overlay actually needs.
/// Mirrors `sim::player::NUM_POWERS`; kept as its own constant so this
/// module doesn't need a dependency on `sim`'s private internals.
const POWER_COUNT: usize = 6;

#[derive(Debug, Clone, Copy)]
pub struct PlayerStats {
    pub health: i32,
    pub armor: i32,
    pub ammo: [i32; 4],
    pub max_ammo: [i32; 4],
    pub cards: u32,
    pub powers: [i32; POWER_COUNT],
    pub damage_flash: f32,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            health: 0,
            armor: 0,
            ammo: [0; 4],
            max_ammo: [0; 4],
            cards: 0,
            powers: [0; POWER_COUNT],
            damage_flash: 0.0,
        }
    }
}

pub fn query_player_stats(player: &Player) -> PlayerStats {
    let mut ammo = [0; 4];
    let mut max_ammo = [0; 4];
    for (i, stock) in player.ammo.iter().enumerate() {
        ammo[i] = stock.count;
        max_ammo[i] = stock.maximum;
    }

    let mut powers = [0; POWER_COUNT];
    powers.copy_from_slice(&player.powers);

    PlayerStats {
        health: player.health,
        armor: player.armor,
        ammo,
        max_ammo,
        cards: player.cards.bits(),
        powers,
        damage_flash: (player.damage_count as f32 / 16.0).min(1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_drains_in_order() {
        let mut hud = HudState::new();
        hud.solid_box(0.0, 0.0, 10.0, 10.0, Rgba(255, 0, 0, 255));
        hud.draw_text("hello", 1.0, 1.0);
        let cmds = hud.take_commands();
        assert_eq!(cmds.len(), 2);
        assert!(hud.take_commands().is_empty());
    }

    #[test]
    fn tag_enable_disable_round_trips() {
        let mut hud = HudState::new();
        assert!(!hud.is_tag_active("door1"));
        hud.enable_tag("door1");
        assert!(hud.is_tag_active("door1"));
        hud.disable_tag("door1");
        assert!(!hud.is_tag_active("door1"));
    }

    #[test]
    fn virtual_scale_identity_at_native_resolution() {
        let (sx, sy) = virtual_scale(320, 200);
        assert_eq!(sx, 1.0);
        assert_eq!(sy, 1.0);
    }
}
