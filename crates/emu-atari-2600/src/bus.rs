//! Atari 2600 bus: address decoding.
//!
//! The 6507 only drives 13 address lines, and the chips decode fewer
//! still:
//!
//! | Select                      | Device    | Address passed on  |
//! |-----------------------------|-----------|--------------------|
//! | A12 set                     | cartridge | `addr & !$D000`    |
//! | A7 set, A10-A12 clear       | RIOT      | `addr & !$DC80`    |
//! | `$0100-$01FF`               | RIOT RAM  | unmasked           |
//! | A7, A9-A12 clear            | TIA       | `addr & !$FE80`    |
//!
//! The stack page lands in RIOT RAM through the mirror at `$0100`. Any
//! other address is a fault.

use atari_tia::Tia;
use emu_core::{Bus, Clock, Fault};
use mos_riot_6532::Riot;

use crate::Inputs;
use crate::cartridge::Cartridge;

const CARTRIDGE_SELECT: u16 = 0x1000;
const CARTRIDGE_STRIP: u16 = 0xD000;

const RIOT_DECODE: u16 = 0xDC80;
const RIOT_SELECT: u16 = 0x0080;

const STACK_START: u16 = 0x0100;
const STACK_END: u16 = 0x0200;

const TIA_DECODE: u16 = 0xFE80;

/// Which device an address decodes to, and the address it sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Cartridge(u16),
    Riot(u16),
    Tia(u16),
    Unmapped,
}

fn decode(address: u16) -> Target {
    if address & CARTRIDGE_SELECT != 0 {
        Target::Cartridge(address & !CARTRIDGE_STRIP)
    } else if address & RIOT_DECODE == RIOT_SELECT {
        Target::Riot(address & !RIOT_DECODE)
    } else if (STACK_START..STACK_END).contains(&address) {
        Target::Riot(address)
    } else if address & TIA_DECODE == 0 {
        Target::Tia(address & !TIA_DECODE)
    } else {
        Target::Unmapped
    }
}

/// The Atari 2600 bus, implementing `emu_core::Bus`.
pub struct AtariBus {
    pub cartridge: Box<dyn Cartridge>,
    pub riot: Riot,
    pub tia: Tia,
    pub inputs: Inputs,
}

impl AtariBus {
    #[must_use]
    pub fn new(cartridge: Box<dyn Cartridge>, tia: Tia) -> Self {
        Self {
            cartridge,
            riot: Riot::new(),
            tia,
            inputs: Inputs::new(),
        }
    }
}

impl Bus for AtariBus {
    fn read(&mut self, clock: &Clock, address: u16) -> Result<u8, Fault> {
        match decode(address) {
            Target::Cartridge(a) => Ok(self.cartridge.read(a)),
            Target::Riot(a) => Ok(self.riot.read(clock, a, &self.inputs)),
            Target::Tia(a) => Ok(self.tia.read(clock, a, &self.inputs)),
            Target::Unmapped => Err(Fault::UnmappedRead { address }),
        }
    }

    fn write(&mut self, clock: &mut Clock, address: u16, value: u8) -> Result<(), Fault> {
        match decode(address) {
            Target::Cartridge(a) => self.cartridge.write(a, value),
            Target::Riot(a) => self.riot.write(clock, a, value),
            Target::Tia(a) => self.tia.write(clock, a, value),
            Target::Unmapped => return Err(Fault::UnmappedWrite { address, value }),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CartridgeKind;
    use crate::cartridge;
    use atari_tia::SilentAudio;

    fn make_bus() -> AtariBus {
        let rom: Vec<u8> = (0..0x1000).map(|i: usize| (i >> 4) as u8).collect();
        let cartridge = cartridge::load(CartridgeKind::SingleBank, &rom).unwrap();
        AtariBus::new(cartridge, Tia::new(Box::new(SilentAudio::default())))
    }

    #[test]
    fn decoding() {
        assert_eq!(decode(0xF123), Target::Cartridge(0x2123));
        assert_eq!(decode(0x1FFC), Target::Cartridge(0x0FFC));
        assert_eq!(decode(0x0080), Target::Riot(0x0000));
        assert_eq!(decode(0x0284), Target::Riot(0x0204));
        assert_eq!(decode(0x01FF), Target::Riot(0x017F));
        assert_eq!(decode(0x0100), Target::Riot(0x0100));
        assert_eq!(decode(0x0002), Target::Tia(0x0002));
        assert_eq!(decode(0x0040), Target::Tia(0x0040));
        assert_eq!(decode(0x007F), Target::Tia(0x007F));
        assert_eq!(decode(0x0200), Target::Unmapped);
    }

    #[test]
    fn cartridge_reads_through_every_mirror() {
        let mut bus = make_bus();
        let clock = Clock::default();
        assert_eq!(bus.read(&clock, 0x1123), Ok(0x12));
        assert_eq!(bus.read(&clock, 0xF123), Ok(0x12));
        assert_eq!(bus.read(&clock, 0x3123), Ok(0x12));
    }

    #[test]
    fn zero_page_ram_and_stack_share_riot_ram() {
        let mut bus = make_bus();
        let mut clock = Clock::default();
        bus.write(&mut clock, 0x0080, 0x11).unwrap();
        bus.write(&mut clock, 0x01FF, 0x22).unwrap();
        assert_eq!(bus.read(&clock, 0x0100), Ok(0x11));
        assert_eq!(bus.read(&clock, 0x00FF), Ok(0x22));
        assert_eq!(bus.riot.peek_ram(0x7F), 0x22);
    }

    #[test]
    fn riot_ports_read_inputs() {
        let mut bus = make_bus();
        let clock = Clock::default();
        bus.inputs.swcha = 0x5A;
        assert_eq!(bus.read(&clock, 0x0280), Ok(0x5A));
        assert_eq!(bus.read(&clock, 0x0282), Ok(0x3F));
    }

    #[test]
    fn tia_write_goes_through_the_bus() {
        let mut bus = make_bus();
        let mut clock = Clock::new(100);
        bus.write(&mut clock, 0x0002, 0).unwrap(); // WSYNC
        assert_eq!(clock.now(), 228);
    }

    #[test]
    fn unmapped_addresses_fault() {
        let mut bus = make_bus();
        let mut clock = Clock::default();
        assert_eq!(
            bus.read(&clock, 0x0200),
            Err(Fault::UnmappedRead { address: 0x0200 })
        );
        assert_eq!(
            bus.write(&mut clock, 0x0A00, 1),
            Err(Fault::UnmappedWrite {
                address: 0x0A00,
                value: 1
            })
        );
    }
}
