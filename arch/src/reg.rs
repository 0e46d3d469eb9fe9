use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum::{Display, EnumString};

/// Named registers. Slot 0 of the register file is the unnamed scratch slot.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive, EnumString, Display,
)]
#[repr(u8)]
pub enum Reg {
    #[strum(to_string = "a", serialize = "A", serialize = "AX")]
    A = 1,
    #[strum(to_string = "b", serialize = "B", serialize = "BX")]
    B,
    #[strum(to_string = "c", serialize = "C", serialize = "CX")]
    C,
}

impl Reg {
    pub const SCRATCH: usize = 0;
    pub const COUNT: usize = 4;

    pub fn parse(s: &str) -> Option<Self> {
        s.to_ascii_uppercase().parse::<Self>().ok()
    }

    pub fn index(self) -> usize {
        u8::from(self) as usize
    }
}

impl From<Reg> for u64 {
    fn from(reg: Reg) -> u64 {
        u8::from(reg) as u64
    }
}

#[test]
fn test() {
    assert_eq!(Reg::parse("a"), Some(Reg::A));
    assert_eq!(Reg::parse("bx"), Some(Reg::B));
    assert_eq!(Reg::parse("CX"), Some(Reg::C));
    assert_eq!(Reg::parse("d"), None);
    assert_eq!(Reg::parse("ab"), None);
    assert_eq!(Reg::B.to_string(), "b");
    assert_eq!(Reg::C.index(), 3);
}
