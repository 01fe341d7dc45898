/// Body mass index for a weight in kilograms and a height in centimeters,
/// rounded half-up to one decimal.
///
/// A non-positive height yields `None` rather than an error; callers treat
/// a missing BMI as "not computable", never as a failure.
pub fn calculate_bmi(weight_kg: f64, height_cm: f64) -> Option<f64> {
    if height_cm <= 0.0 {
        return None;
    }
    let height_m = height_cm / 100.0;
    Some(((weight_kg / (height_m * height_m)) * 10.0).round() / 10.0)
}
