#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data)
        && let Ok(entry) = dialtrail::fuzzing::parse_host_override_input(input)
    {
        debug_assert!(!entry.host.is_empty());
    }
});
