#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data)
        && let Ok(args) = dialtrail::fuzzing::apply_config_from_json(input)
    {
        for range in &args.blacklist {
            debug_assert!(range.contains(range.network()));
        }
    }
});
