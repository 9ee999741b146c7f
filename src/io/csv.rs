/*!
# I/O Utilities for Saving Chain Output to CSV

Saves finalized chains to CSV files. Enable via the `csv` feature.
*/

use std::error::Error;
use std::fs::File;

use csv::Writer;

use crate::core::ChainRun;

/**
Saves the output of a multi-chain run as a CSV file.

The resulting file has a header row `"chain"`, `"sample"`, `"alpha"` and one
row per chain entry, burn-in included (post-process before saving if you want
the thinned sequence instead).

# Examples

```rust
use ndarray::arr1;
use salpeter_mcmc::core::ChainRun;
use salpeter_mcmc::io::csv::save_csv;

let run = ChainRun {
    samples: arr1(&[3.0, 2.9, 2.9]),
    acceptance_rate: 0.5,
};
save_csv(&[run], "/tmp/chain.csv").expect("Expecting saving data to succeed");
```
*/
pub fn save_csv<T: std::fmt::Display>(
    runs: &[ChainRun<T>],
    filename: &str,
) -> Result<(), Box<dyn Error>> {
    let mut wtr = Writer::from_writer(File::create(filename)?);
    wtr.write_record(["chain", "sample", "alpha"])?;

    for (chain_idx, run) in runs.iter().enumerate() {
        for (sample_idx, value) in run.samples.iter().enumerate() {
            wtr.write_record(&[
                chain_idx.to_string(),
                sample_idx.to_string(),
                value.to_string(),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
