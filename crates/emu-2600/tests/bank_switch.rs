//! Cartridge bank switching observed through the whole machine.

use emu_2600::{Basic, Cartridge, TvType, Vcs};

/// An F8 image: bank 0 is a NOP sled, bank 1 boots with a hotspot read
/// that switches to bank 0. Both banks carry vectors at the top.
fn f8_rom() -> Vec<u8> {
    let mut bank0 = vec![0xea; 4096];
    bank0[0x0ffc] = 0x00;
    bank0[0x0ffd] = 0xf0;

    let mut bank1 = vec![0x11; 4096];
    // LDA $FFF8 - the read switches to bank 0
    bank1[0x0000] = 0xad;
    bank1[0x0001] = 0xf8;
    bank1[0x0002] = 0xff;
    bank1[0x0ffc] = 0x00;
    bank1[0x0ffd] = 0xf0;

    let mut rom = bank0;
    rom.extend(bank1);
    rom
}

fn console_with(rom: Vec<u8>) -> Vcs {
    let mut vcs = Vcs::new(Box::new(Basic::new(TvType::Ntsc)));
    vcs.attach(Cartridge::attach(rom).unwrap()).unwrap();
    vcs
}

#[test]
fn size_dispatch_selects_f8() {
    let cart = Cartridge::attach(f8_rom()).unwrap();
    assert_eq!(cart.id(), "F8");
    assert_eq!(cart.num_banks(), 2);
}

#[test]
fn hotspot_reads_switch_banks_on_the_bus() {
    let mut vcs = console_with(f8_rom());

    // power-on bank is the last one
    assert_eq!(vcs.get_bank(0x1000), 1);

    let byte = vcs.mem.read(0x1ff8).unwrap();
    assert_eq!(vcs.get_bank(0x1000), 0);
    // the switched read returns the new bank's byte
    assert_eq!(byte, 0xea);

    let byte = vcs.mem.read(0x1ff9).unwrap();
    assert_eq!(vcs.get_bank(0x1000), 1);
    assert_eq!(byte, 0x11);
}

#[test]
fn bank_switch_lands_before_the_next_fetch() {
    let mut vcs = console_with(f8_rom());
    assert_eq!(vcs.get_bank(vcs.cpu.pc.value()), 1);

    // LDA $FFF8 executes from bank 1 and switches banks underneath
    // itself
    let mut hook = |_: &emu_2600::Tia| emu_2600::VideoCycleCommand::Continue;
    vcs.step(&mut hook).unwrap();

    assert_eq!(vcs.get_bank(vcs.cpu.pc.value()), 0);

    // the next instruction comes out of bank 0: a NOP, not bank 1
    // filler
    vcs.step(&mut hook).unwrap();
    assert_eq!(vcs.cpu.last_result.defn.unwrap().mnemonic, "NOP");
}

#[test]
fn debugger_peek_does_not_switch_banks() {
    let vcs = console_with(f8_rom());
    assert_eq!(vcs.get_bank(0x1000), 1);
    let _ = vcs.peek(0x1ff8);
    assert_eq!(vcs.get_bank(0x1000), 1);
}

#[test]
fn rom_writes_complete_without_failing_the_instruction() {
    let mut rom = vec![0xea; 4096];
    // STA $F800 - a write into ROM
    rom[0x0000] = 0x8d;
    rom[0x0001] = 0x00;
    rom[0x0002] = 0xf8;
    rom[0x0ffc] = 0x00;
    rom[0x0ffd] = 0xf0;

    let mut vcs = console_with(rom);
    let mut hook = |_: &emu_2600::Tia| emu_2600::VideoCycleCommand::Continue;
    vcs.step(&mut hook).unwrap();
    assert!(vcs.cpu.last_result.finalised);
}
