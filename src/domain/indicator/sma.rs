//! Simple Moving Average.
//!
//! SMA(n)[i] = mean(C[i-n+1..=i]), maintained as a running window sum.
//! Warmup: first (n-1) bars are undefined.

pub fn calculate_sma(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; closes.len()];
    }

    let mut values = Vec::with_capacity(closes.len());
    let mut window_sum = 0.0;

    for (i, &close) in closes.iter().enumerate() {
        window_sum += close;
        if i >= period {
            window_sum -= closes[i - period];
        }

        if i + 1 >= period {
            values.push(Some(window_sum / period as f64));
        } else {
            values.push(None);
        }
    }

    values
}
