use bitflags::bitflags;

use crate::*;

bitflags! {
    /// Per-tile save bits.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct TileBits: u8 {
        const HIDDEN = 1;
        const MINE = 2;
        const FLAGGED = 4;
        const RED = 8;
        const REMOVED = 16;
    }
}

/// Texture selection the frontend draws for a tile, below any running animation.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Face {
    pub background: Option<TextureId>,
    pub overlay: Option<TextureId>,
}

impl Face {
    pub const EMPTY: Self = Self {
        background: None,
        overlay: None,
    };

    pub const HIDDEN: Self = Self {
        background: Some(TextureId::Hidden),
        overlay: None,
    };

    const fn floor(red: bool) -> Option<TextureId> {
        Some(if red {
            TextureId::RedSquare
        } else {
            TextureId::BlankSquare
        })
    }

    pub const fn number(touching: u8, red: bool) -> Self {
        Self {
            background: Self::floor(red),
            overlay: if touching == 0 {
                None
            } else {
                Some(TextureId::Number(touching))
            },
        }
    }

    pub const fn mine(red: bool) -> Self {
        Self {
            background: Self::floor(red),
            overlay: Some(TextureId::Mine),
        }
    }
}

/// One board cell and the animation slot that decorates it.
#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    row: Coord,
    col: Coord,
    mine: bool,
    hidden: bool,
    flagged: bool,
    red: bool,
    removed: bool,
    touching: u8,
    face: Face,
    pub(crate) slot: AnimationSlot,
}

impl Tile {
    pub fn new((row, col): Coord2) -> Self {
        Self {
            row,
            col,
            mine: false,
            hidden: true,
            flagged: false,
            red: false,
            removed: false,
            touching: 0,
            face: Face::HIDDEN,
            slot: AnimationSlot::new(),
        }
    }

    pub fn coords(&self) -> Coord2 {
        (self.row, self.col)
    }

    pub fn is_mine(&self) -> bool {
        self.mine
    }

    pub fn is_safe(&self) -> bool {
        !self.mine
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn is_revealed(&self) -> bool {
        !self.hidden
    }

    pub fn is_flagged(&self) -> bool {
        self.flagged
    }

    pub fn is_red(&self) -> bool {
        self.red
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Touching-mine count, known once the tile has been flipped.
    pub fn touching(&self) -> u8 {
        self.touching
    }

    pub fn face(&self) -> Face {
        self.face
    }

    pub fn slot(&self) -> &AnimationSlot {
        &self.slot
    }

    pub(crate) fn set_mine(&mut self, mine: bool) {
        self.mine = mine;
    }

    pub(crate) fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    pub(crate) fn set_flagged(&mut self, flagged: bool) {
        self.flagged = flagged;
    }

    pub(crate) fn set_touching(&mut self, touching: u8) {
        self.touching = touching;
    }

    pub(crate) fn set_face(&mut self, face: Face) {
        self.face = face;
    }

    pub(crate) fn mark_red(&mut self) {
        self.red = true;
        self.face.background = Some(TextureId::RedSquare);
    }

    /// Back to a hidden, unflagged, mine-free tile. The caller must have killed the slot first.
    pub(crate) fn reset(&mut self) {
        debug_assert!(!self.slot.is_any_active());
        self.mine = false;
        self.hidden = true;
        self.flagged = false;
        self.red = false;
        self.removed = false;
        self.touching = 0;
        self.face = Face::HIDDEN;
    }

    pub fn bits(&self) -> TileBits {
        let mut bits = TileBits::empty();
        bits.set(TileBits::HIDDEN, self.hidden);
        bits.set(TileBits::MINE, self.mine);
        bits.set(TileBits::FLAGGED, self.flagged);
        bits.set(TileBits::RED, self.red);
        bits.set(TileBits::REMOVED, self.removed);
        bits
    }

    pub(crate) fn apply_bits(&mut self, bits: TileBits) {
        self.hidden = bits.contains(TileBits::HIDDEN);
        self.mine = bits.contains(TileBits::MINE);
        self.flagged = bits.contains(TileBits::FLAGGED);
        self.red = bits.contains(TileBits::RED);
        self.removed = bits.contains(TileBits::REMOVED);
    }

    /// Face implied by the tile state alone, used when there is no animation to drive it.
    pub fn settled_face(&self) -> Face {
        if self.removed {
            Face::EMPTY
        } else if self.hidden {
            Face {
                background: Some(if self.red {
                    TextureId::RedSquare
                } else {
                    TextureId::Hidden
                }),
                overlay: self.flagged.then_some(TextureId::Flag),
            }
        } else if self.mine {
            Face::mine(self.red)
        } else {
            Face::number(self.touching, self.red)
        }
    }

    /// Reacts to the tile's own animation lifecycle.
    pub(crate) fn handle(&mut self, notice: Notice) {
        use AnimCode::*;

        match notice {
            Notice::Started(Uncover) => self.face = Face::number(self.touching, self.red),
            Notice::Started(RevealMine) => self.face = Face::mine(self.red),
            Notice::Finished(Flag) if self.flagged && self.hidden => {
                self.face.overlay = Some(TextureId::Flag);
            }
            Notice::Started(WinTile) => self.face = Face::EMPTY,
            Notice::Finished(WinTile) => self.removed = true,
            _ => {}
        }
    }

    pub(crate) fn highlight(&mut self) -> bool {
        if self.hidden && !self.flagged && self.face.background == Some(TextureId::Hidden) {
            self.face.background = Some(TextureId::Highlight);
            true
        } else {
            false
        }
    }

    pub(crate) fn unhighlight(&mut self) {
        if self.face.background == Some(TextureId::Highlight) {
            self.face.background = Some(TextureId::Hidden);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_tile_is_hidden_and_clean() {
        let tile = Tile::new((2, 5));
        assert_eq!(tile.coords(), (2, 5));
        assert_eq!(tile.bits(), TileBits::HIDDEN);
        assert_eq!(tile.face(), Face::HIDDEN);
    }

    #[test]
    fn bits_map_to_flags() {
        let mut tile = Tile::new((0, 0));
        tile.apply_bits(TileBits::MINE | TileBits::FLAGGED | TileBits::HIDDEN);
        assert!(tile.is_mine());
        assert!(tile.is_flagged());
        assert!(tile.is_hidden());
        assert!(!tile.is_red());
        assert_eq!(tile.bits().bits(), 0b0111);
    }

    #[test]
    fn uncover_start_shows_number() {
        let mut tile = Tile::new((0, 0));
        tile.set_hidden(false);
        tile.set_touching(3);
        tile.handle(Notice::Started(AnimCode::Uncover));
        assert_eq!(tile.face(), Face::number(3, false));
        assert_eq!(tile.face().overlay, Some(TextureId::Number(3)));
    }

    #[test]
    fn flag_overlay_appears_only_when_still_flagged() {
        let mut tile = Tile::new((0, 0));
        tile.handle(Notice::Finished(AnimCode::Flag));
        assert_eq!(tile.face().overlay, None);

        tile.set_flagged(true);
        tile.handle(Notice::Finished(AnimCode::Flag));
        assert_eq!(tile.face().overlay, Some(TextureId::Flag));
    }

    #[test]
    fn win_fade_removes_on_finish() {
        let mut tile = Tile::new((0, 0));
        tile.set_mine(true);
        tile.handle(Notice::Started(AnimCode::WinTile));
        assert!(!tile.is_removed());
        assert_eq!(tile.face(), Face::EMPTY);
        tile.handle(Notice::Finished(AnimCode::WinTile));
        assert!(tile.is_removed());
        assert_eq!(tile.settled_face(), Face::EMPTY);
    }

    #[test]
    fn highlight_round_trips() {
        let mut tile = Tile::new((0, 0));
        assert!(tile.highlight());
        assert_eq!(tile.face().background, Some(TextureId::Highlight));
        tile.unhighlight();
        assert_eq!(tile.face(), Face::HIDDEN);

        tile.set_flagged(true);
        assert!(!tile.highlight());
    }
}
