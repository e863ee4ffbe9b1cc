pub mod forecast;
pub mod peaks;
pub mod smoothing;

pub use forecast::predict_next_peak;
pub use peaks::daily_evening_peaks;
pub use smoothing::{smooth_dataset, smooth_series};
