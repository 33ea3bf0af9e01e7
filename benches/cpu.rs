use criterion::{Criterion, black_box, criterion_group, criterion_main};

use fidelis::config::Config;
use fidelis::system::System;

/// NROM-128 image looping 256 times over a PPU status read and a RAM store.
fn busy_loop_rom() -> Vec<u8> {
    #[rustfmt::skip]
    let code = [
        0xA2, 0x00,       // loop: LDX #$00
        0xAD, 0x02, 0x20, // inner: LDA $2002
        0xE8,             // INX
        0x8E, 0x00, 0x02, // STX $0200
        0xD0, 0xF7,       // BNE inner
        0x4C, 0x00, 0x80, // JMP loop
    ];
    let mut prg = vec![0xEA; 0x4000];
    prg[..code.len()].copy_from_slice(&code);
    prg[0x3FFC] = 0x00;
    prg[0x3FFD] = 0x80;

    let mut rom = b"NES\x1A\x01\x01\x00\x00".to_vec();
    rom.extend_from_slice(&[0; 8]);
    rom.extend_from_slice(&prg);
    rom.extend_from_slice(&[0; 0x2000]);
    rom
}

fn bench_cpu(c: &mut Criterion) {
    let rom = busy_loop_rom();

    c.bench_function("step 1000 instructions", |b| {
        let mut system = System::new(Config::default());
        system.load_cart_bytes(&rom).unwrap();
        b.iter(|| {
            for _ in 0..1000 {
                system.step().unwrap();
            }
            black_box(system.registers())
        })
    });

    c.bench_function("run one frame", |b| {
        let mut system = System::new(Config::default());
        system.load_cart_bytes(&rom).unwrap();
        b.iter(|| {
            system.run_frame().unwrap();
            black_box(system.registers().cycles)
        })
    });
}

criterion_group!(benches, bench_cpu);
criterion_main!(benches);
