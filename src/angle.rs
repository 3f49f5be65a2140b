// angles in degrees, wrapped into a half-open 360 degree range

fn wrap(angle: f64, low: f64) -> f64 {
    let wrapped = (angle - low).rem_euclid(360.0) + low;
    // rem_euclid rounds tiny negative remainders up to exactly 360
    if wrapped >= low + 360.0 {
        low
    } else {
        wrapped
    }
}

/// `angle1 - angle2` wrapped into [-180, 180).
pub fn angle_diff(angle1: f64, angle2: f64) -> f64 {
    angle_wrap_center(angle1 - angle2)
}

/// `angle` wrapped into [-180, 180).
pub fn angle_wrap_center(angle: f64) -> f64 {
    wrap(angle, -180.0)
}

/// `angle` wrapped into [0, 360).
pub fn angle_wrap_nonnegative(angle: f64) -> f64 {
    wrap(angle, 0.0)
}

/// Panic if two angles differ by more than `max_diff`, ignoring wrap.
#[track_caller]
pub fn assert_angles_almost_equal(angle1: f64, angle2: f64, max_diff: f64) {
    let diff = angle_diff(angle1, angle2).abs();
    if !(diff <= max_diff) {
        panic!("{} and {} differ by {} > {}", angle1, angle2, diff, max_diff);
    }
}
