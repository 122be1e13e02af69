#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parsing and validation must reject bad input with an error, never a panic.
    let Ok(cfg) = cover_config::load_toml(data) else {
        return;
    };
    let _ = cfg.validate();
    let report = cfg.validate_covers();
    for cover in report.accepted {
        for packet in [&cover.command_open, &cover.tilt_command_stop].into_iter().flatten() {
            let _ = cover_config::decode_packet(packet);
        }
    }
});
