#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data)
        && let Ok(range) = dialtrail::fuzzing::parse_ip_range_input(input)
    {
        debug_assert!(range.contains(range.network()));
        let reparsed = dialtrail::fuzzing::parse_ip_range_input(&range.to_string());
        debug_assert!(reparsed.is_ok_and(|value| value == range));
    }
});
