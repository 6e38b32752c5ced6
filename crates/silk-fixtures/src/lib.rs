//! In-memory SiLK file builder for tests, benches and fuzz seeds.
//!
//! Produces headers in either padding style, the three record shapes in
//! both byte orders, and zlib, LZO or Snappy framed blocks.

pub mod builder;
pub mod compress;
pub mod flows;

pub use builder::{FileBuilder, HeaderPadding, encode_record};
pub use compress::compress_block;
pub use flows::{
    SCENARIO_FILE_DATE_MS, SCENARIO_SENSOR, generated_flows, scenario_capture, scenario_flows,
};
