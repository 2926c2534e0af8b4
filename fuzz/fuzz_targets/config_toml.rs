#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data)
        && let Ok(args) = dialtrail::fuzzing::apply_config_from_toml(input)
    {
        debug_assert!(args.vus.get() > 0);
        debug_assert!(args.iterations.get() > 0);
    }
});
