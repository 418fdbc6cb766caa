//! Deterministic synthetic sales data.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::dataset::{SalesDataset, SalesRecord};

const N_PRODUCTS: u32 = 10;
const HOLIDAY_RATE: f64 = 0.2;
const EVENT_RATE: f64 = 0.15;
const HOLIDAY_UPLIFT: f64 = 15.0;
const EVENT_UPLIFT: f64 = 25.0;
const NOISE: f64 = 3.0;

/// Generate `n_rows` integer-coded sales records.
///
/// `ProductID` is uniform in `1..=10`; `HolidayIndicator` and `SpecialEvent`
/// are independent Bernoulli flags. `SalesQuantity` is a per-product base
/// of `20 + 5·ProductID`, plus fixed holiday and event uplifts, plus uniform
/// noise, rounded to whole units and floored at zero.
#[must_use]
pub fn synthetic_sales(n_rows: usize, seed: u64) -> SalesDataset {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n_rows)
        .map(|_| {
            let product_id = rng.gen_range(1..=N_PRODUCTS);
            let holiday_indicator = u8::from(rng.gen_bool(HOLIDAY_RATE));
            let special_event = u8::from(rng.gen_bool(EVENT_RATE));

            let mean = 20.0
                + 5.0 * f64::from(product_id)
                + HOLIDAY_UPLIFT * f64::from(holiday_indicator)
                + EVENT_UPLIFT * f64::from(special_event);
            let noise = rng.gen_range(-NOISE..=NOISE);

            SalesRecord {
                product_id,
                holiday_indicator,
                special_event,
                sales_quantity: (mean + noise).round().max(0.0),
            }
        })
        .collect()
}
