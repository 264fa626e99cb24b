//! Network latency/bandwidth sampling (§4.10). Latency times a GET `/`
//! round trip to the master's gateway, matching the original's
//! `CollectNetLatency()`. Bandwidth is either a fixed constant or, with
//! `--bandwidth-fluctuate`, a uniform random draw in `[50, 500]` Mbps —
//! the original hardcodes a hypothetical testbed value here rather than
//! measuring real throughput, and this implementation keeps that.

use std::time::Instant;

use rand::Rng;

const FIXED_BANDWIDTH_MBPS: f64 = 1000.0;

pub async fn latency_ms(http: &reqwest::Client, gateway_base_url: &str) -> f64 {
    let start = Instant::now();
    match http.get(gateway_base_url).send().await {
        Ok(_) => start.elapsed().as_secs_f64() * 1000.0,
        Err(_) => start.elapsed().as_secs_f64() * 1000.0,
    }
}

pub fn bandwidth_mbps(fluctuate: bool) -> f64 {
    if fluctuate {
        rand::thread_rng().gen_range(50.0..=500.0)
    } else {
        FIXED_BANDWIDTH_MBPS
    }
}
