//! # Heading Calculation
//!
//! Flat-plane bearing between consecutive waypoints, used for yaw tracking.
//!
//! No projection or geodesic correction is applied: longitude and latitude
//! offsets are treated as planar `x`/`y`, which is close enough over the
//! short legs of a survey.

/// Bearing in degrees from `from` to `to`, both `(lon, lat)`
///
/// Measured clockwise from north and normalized into `[0, 360)`.
///
/// # Examples
///
/// ```
/// use plan_to_wpl::converter::heading::bearing_deg;
///
/// let east = bearing_deg((8.0, 47.0), (8.001, 47.0));
/// assert!((east - 90.0).abs() < 1e-9);
/// ```
pub fn bearing_deg(from: (f64, f64), to: (f64, f64)) -> f64 {
    let d_lon = to.0 - from.0;
    let d_lat = to.1 - from.1;
    let bearing = (360.0 + d_lon.atan2(d_lat).to_degrees()) % 360.0;
    // -0.0 and values rounding up to 360.0 both mean north
    if bearing >= 360.0 || bearing == 0.0 {
        0.0
    } else {
        bearing
    }
}
