use crate::rng::Entropy;

/// Highest code in the glyph alphabet (`0..=126`).
pub(crate) const MAX_SYMBOL: u8 = 126;

// These render as an at-sign and the two halves of a logo in the code font.
const ASPERAND: u8 = 64;
const LOGO_LEFT: u8 = 96;
const LOGO_RIGHT: u8 = 97;
// Mirrored "2"; takes over the masked codes.
pub(crate) const BACKWARDS_TWO: u8 = 50;

pub(crate) fn random_symbol<R: Entropy + ?Sized>(rng: &mut R) -> u8 {
    let code = rng.int_in(0, MAX_SYMBOL as i32) as u8;
    match code {
        ASPERAND | LOGO_LEFT | LOGO_RIGHT => BACKWARDS_TWO,
        c => c,
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Glyph {
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) symbol: u8,
}

impl Glyph {
    pub(crate) fn new<R: Entropy + ?Sized>(x: f32, y: f32, rng: &mut R) -> Self {
        Self {
            x,
            y,
            symbol: random_symbol(rng),
        }
    }

    pub(crate) fn randomize<R: Entropy + ?Sized>(&mut self, rng: &mut R) {
        self.symbol = random_symbol(rng);
    }
}
