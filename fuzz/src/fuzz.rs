#![no_main]
use libfuzzer_sys::fuzz_target;
use std::convert::TryInto;
use taiutc::*;

fn fuzz_nist(data: &[u8]) {
    let parsed = match nist::read_bytes(data) {
        Ok(parsed) => parsed,
        Err(_) => return,
    };
    // anything we accept must survive a round trip
    let updated = parsed.first().mjd();
    let text = nist::format(&parsed, updated).unwrap();
    let again = nist::read_str(&text).unwrap();
    assert_eq!(parsed, again);
}

fn fuzz_convert(data: &[u8]) {
    let mut times = data
        .chunks_exact(8)
        .map(|chunk| f64::from_le_bytes(chunk.try_into().unwrap()))
        .filter(|t| t.is_finite() && t.abs() < 1e12)
        .collect::<Vec<f64>>();
    times.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let conv = LeapSecondConverter::new(nist::bundled().unwrap())
        .before_first(BeforeFirst::Clamp);
    let mut prev = f64::NEG_INFINITY;
    for utc in times {
        let tai = conv.tai_from_utc(utc).unwrap();
        assert!(tai >= prev, "{} -> {} < {}", utc, tai, prev);
        let dtai = tai - utc;
        assert!((9.999..=37.001).contains(&dtai), "{} -> {}", utc, dtai);
        prev = tai;
    }
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 1 {
        return;
    }
    let rest = &data[1..];
    match data[0] {
        0 => fuzz_nist(rest),
        1 => fuzz_convert(rest),
        _ => (),
    }
});
