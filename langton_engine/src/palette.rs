use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Color returned for states the palette knows nothing about.
pub const FALLBACK_COLOR: &str = "#FF00FF";

/// Largest number of states a [`StatePalette`] keeps colors for. Higher states get the fallback color.
pub const MAX_PALETTE_COLORS: usize = 256;

const BACKGROUND_COLOR: &str = "#FFFFFF";

const DEFAULT_COLORS: [&str; 6] = [
    "#FFFFFF", "#000000", "#0074D9", "#2ECC40", "#FFDC00", "#B10DC9",
];
const WARM_COLORS: [&str; 4] = ["#FFFFFF", "#FF4136", "#FF851B", "#FFDC00"];
const COOL_COLORS: [&str; 5] = ["#FFFFFF", "#0074D9", "#7FDBFF", "#2ECC40", "#B10DC9"];

/// Maps cell states to display colors.
///
/// The engine owns no color data; it only asks the palette to be large enough
/// whenever the highest state in use changes.
pub trait Palette: Send + Sync {
    fn color_for_state(&self, state: u32) -> String;

    /// Makes sure at least `count` states have a color.
    fn ensure_color_count(&mut self, count: usize);
}

/// The named palettes a [`StatePalette`] can be built from.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteKind {
    #[default]
    Default,
    Grayscale,
    Warm,
    Cool,
    Randomized,
}

impl FromStr for PaletteKind {
    type Err = String;

    fn from_str(value: &str) -> Result<PaletteKind, String> {
        match value {
            "default" => Ok(PaletteKind::Default),
            "grayscale" => Ok(PaletteKind::Grayscale),
            "warm" => Ok(PaletteKind::Warm),
            "cool" => Ok(PaletteKind::Cool),
            "randomized" => Ok(PaletteKind::Randomized),
            _ => Err(format!("unknown palette: {}", value)),
        }
    }
}

/// A palette that grows on demand, filling gaps with random colors.
pub struct StatePalette {
    kind: PaletteKind,
    colors: Vec<String>,
    rng: StdRng,
}

impl StatePalette {
    pub fn new(kind: PaletteKind, seed: Option<u64>) -> StatePalette {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut palette = StatePalette {
            kind,
            colors: Vec::new(),
            rng,
        };
        palette.populate(DEFAULT_COLORS.len());

        palette
    }

    pub fn kind(&self) -> PaletteKind {
        self.kind
    }

    /// Switches to another named palette, keeping the current number of colors.
    pub fn set_kind(&mut self, kind: PaletteKind) {
        self.kind = kind;
        let count = self.colors.len();
        self.populate(count);
    }

    /// Overrides the color of a single state.
    pub fn set_color(&mut self, state: u32, color: &str) {
        if parse_hex_color(color).is_none() {
            warn!(state, color, "ignoring color that is not a hex color");
            return;
        }
        if state as usize >= MAX_PALETTE_COLORS {
            warn!(state, "ignoring color for a state above the palette limit");
            return;
        }

        self.ensure_color_count(state as usize + 1);
        self.colors[state as usize] = color.to_string();
    }

    pub fn colors(&self) -> &[String] {
        &self.colors
    }

    fn populate(&mut self, count: usize) {
        let count = count.clamp(1, MAX_PALETTE_COLORS);
        let mut colors: Vec<String> = match self.kind {
            PaletteKind::Default => DEFAULT_COLORS.iter().map(|c| c.to_string()).collect(),
            PaletteKind::Warm => WARM_COLORS.iter().map(|c| c.to_string()).collect(),
            PaletteKind::Cool => COOL_COLORS.iter().map(|c| c.to_string()).collect(),
            PaletteKind::Grayscale => grayscale_colors(count),
            PaletteKind::Randomized => vec![BACKGROUND_COLOR.to_string()],
        };

        while colors.len() < count {
            colors.push(random_hex_color(&mut self.rng));
        }
        colors.truncate(count);

        debug!(kind = ?self.kind, count, "populated palette");
        self.colors = colors;
    }
}

impl Palette for StatePalette {
    fn color_for_state(&self, state: u32) -> String {
        self.colors
            .get(state as usize)
            .cloned()
            .unwrap_or_else(|| FALLBACK_COLOR.to_string())
    }

    fn ensure_color_count(&mut self, count: usize) {
        let count = if count > MAX_PALETTE_COLORS {
            warn!(
                requested = count,
                max = MAX_PALETTE_COLORS,
                "too many states to color, higher states use the fallback color"
            );
            MAX_PALETTE_COLORS
        } else {
            count
        };
        if self.colors.len() >= count {
            return;
        }

        if self.kind == PaletteKind::Grayscale {
            // Grays are spread over the whole range, so they depend on the total count
            self.populate(count);
            return;
        }

        let fixed: &[&str] = match self.kind {
            PaletteKind::Default => &DEFAULT_COLORS,
            PaletteKind::Warm => &WARM_COLORS,
            PaletteKind::Cool => &COOL_COLORS,
            _ => &[],
        };
        while self.colors.len() < count {
            let color = match fixed.get(self.colors.len()) {
                Some(color) => color.to_string(),
                None => random_hex_color(&mut self.rng),
            };
            self.colors.push(color);
        }
    }
}

/// White for the background, black for state 1, then evenly spaced grays.
fn grayscale_colors(count: usize) -> Vec<String> {
    let mut colors = vec![BACKGROUND_COLOR.to_string()];
    if count > 1 {
        colors.push("#000000".to_string());
    }

    let shades = count.saturating_sub(2);
    if shades > 0 {
        // Stay within 20..240 so grays never collide with black or white
        let step = 220 / (shades + 1);
        for i in 0..shades {
            let shade = 20 + (i + 1) * step;
            colors.push(format!("#{:02x}{:02x}{:02x}", shade, shade, shade));
        }
    }

    colors.truncate(count);
    colors
}

/// A random `#rrggbb` color.
pub fn random_hex_color<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("#{:06x}", rng.gen_range(0..0x1000000_u32))
}

/// Parses `#rgb` or `#rrggbb` into its red, green and blue components.
pub fn parse_hex_color(color: &str) -> Option<(u8, u8, u8)> {
    static HEX_COLOR: OnceLock<Regex> = OnceLock::new();
    let pattern = HEX_COLOR.get_or_init(|| {
        Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("hex color pattern is valid")
    });

    let digits = pattern.captures(color.trim())?.get(1)?.as_str();
    let channel = |hex: &str| u8::from_str_radix(hex, 16).ok();

    if digits.len() == 3 {
        let expand = |i: usize| channel(digits[i..i + 1].repeat(2).as_str());
        Some((expand(0)?, expand(1)?, expand(2)?))
    } else {
        Some((
            channel(&digits[0..2])?,
            channel(&digits[2..4])?,
            channel(&digits[4..6])?,
        ))
    }
}
