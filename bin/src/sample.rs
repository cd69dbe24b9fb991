//! Selection Sampling

use closures::*;
use pbrt_core::app::create_progress_bar;
use pbrt_core::report_stats;
use pbrt_core::sampler::*;
use std::ops::Deref;
use std::thread;

/// Number of selections drawn per unit of work.
const SAMPLES_PER_BATCH: usize = 4096;

/// Draws `samples` stochastic selections from a composite and returns how
/// often each entry was picked. Every worker builds its own scratch
/// composite and owns a sampler on its own stream.
///
/// * `build`     - Builds a worker's scratch composite.
/// * `samples`   - Number of selections.
/// * `n_threads` - Number of worker threads.
/// * `seed`      - Optional seed for the samplers.
/// * `quiet`     - Hide the progress bar.
pub fn sample_selections<C, F>(build: F, samples: usize, n_threads: usize, seed: Option<u64>, quiet: bool) -> Vec<u64>
where
    C: Deref<Target = CompositeClosure>,
    F: Fn() -> C + Sync,
{
    let num_closures = build().num_closures();
    let mut histogram = vec![0_u64; num_closures];
    if num_closures == 0 || samples == 0 {
        return histogram;
    }

    let n_threads = n_threads.max(1);
    let n_batches = (samples + SAMPLES_PER_BATCH - 1) / SAMPLES_PER_BATCH;
    let progress = create_progress_bar(n_batches as u64, quiet);
    progress.set_message("Sampling selections");

    thread::scope(|scope| {
        let (tx_collector, rx_collector) = crossbeam_channel::bounded::<Vec<u64>>(n_threads);
        let (tx_worker, rx_worker) = crossbeam_channel::bounded::<usize>(n_threads);

        // Spawn collector thread.
        let histogram: &mut [u64] = histogram.as_mut_slice();
        scope.spawn(move || {
            for counts in rx_collector.iter() {
                for (h, c) in histogram.iter_mut().zip(counts) {
                    *h += c;
                }
            }
        });

        // Spawn worker threads.
        for worker in 0..n_threads {
            let rx_worker = rx_worker.clone();
            let tx_collector = tx_collector.clone();
            let build = &build;
            let progress = &progress;
            scope.spawn(move || {
                let composite = build();
                let mut sampler = RandomSampler::new(seed, worker as u64);

                for batch_size in rx_worker.iter() {
                    let mut counts = vec![0_u64; num_closures];
                    for _ in 0..batch_size {
                        counts[composite.choose_with_sampler(&mut sampler)] += 1;
                    }
                    if tx_collector.send(counts).is_err() {
                        break;
                    }
                    progress.inc(1);
                }

                // Report per thread statistics.
                report_stats!();
            });
        }
        drop(rx_worker); // Drop extra since we've cloned one for each worker.
        drop(tx_collector);

        // Send work.
        let mut remaining = samples;
        while remaining > 0 {
            let batch_size = remaining.min(SAMPLES_PER_BATCH);
            if tx_worker.send(batch_size).is_err() {
                break;
            }
            remaining -= batch_size;
        }
    });

    progress.finish_with_message("Sampling complete");
    histogram
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
