#[macro_use]
extern crate log;
#[macro_use]
extern crate pest_derive;

mod parser;
mod sample;

use closures::*;
use pbrt_core::app::*;
use pbrt_core::geometry::*;
use pbrt_core::{print_stats, report_stats};
use itertools::Itertools;
use parser::*;
use sample::*;
use std::fs;
use std::io::{self, BufRead};
use std::ops::Deref;

#[cfg(all(feature = "dhat-rs", feature = "jemalloc"))]
compile_error!("feature 'dhat-rs' and feature 'jemalloc' cannot be enabled at the same time");

#[cfg(feature = "dhat-rs")]
use dhat::{Dhat, DhatAlloc};

#[cfg(feature = "dhat-rs")]
#[global_allocator]
static ALLOCATOR: DhatAlloc = DhatAlloc;

#[cfg(feature = "jemalloc")]
#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(feature = "jemalloc")]
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static ALLOCATOR: Jemalloc = Jemalloc;

fn main() {
    #[cfg(feature = "dhat-rs")]
    let _dhat = Dhat::start_heap_profiling();

    // Initialize `env_logger`.
    env_logger::init();

    // The registry is complete before any composite is built.
    let registry = ClosureRegistry::with_builtin_closures();

    if OPTIONS.list {
        list_closures(&registry);
        return;
    }

    let exprs = match collect_exprs() {
        Ok(exprs) => exprs,
        Err(e) => {
            error!("{e}");
            return;
        }
    };

    for expr in exprs.iter() {
        // In case of error report it and continue.
        if let Err(e) = inspect(&registry, expr) {
            error!("{e}");
        }
    }

    if OPTIONS.stats {
        report_stats!();
        print_stats!();
    }
}

/// Returns the expressions given with `--expr`, read from the input files,
/// or read from stdin when neither is given. Blank lines and lines starting
/// with `#` are skipped.
fn collect_exprs() -> Result<Vec<String>, String> {
    let mut exprs = OPTIONS.exprs.clone();

    for path in OPTIONS.paths.iter() {
        let contents = fs::read_to_string(path).map_err(|e| format!("Unable to read '{path}'. {e}"))?;
        exprs.extend(expr_lines(contents.lines()));
    }

    if OPTIONS.exprs.is_empty() && OPTIONS.paths.is_empty() {
        let lines: Vec<String> = io::stdin()
            .lock()
            .lines()
            .collect::<Result<_, _>>()
            .map_err(|e| format!("Unable to read stdin. {e}"))?;
        exprs.extend(expr_lines(lines.iter().map(String::as_str)));
    }

    Ok(exprs)
}

/// Returns the non-empty, non-comment lines.
///
/// * `lines` - Input lines.
fn expr_lines<'a>(lines: impl Iterator<Item = &'a str>) -> Vec<String> {
    lines
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

/// Prints the registered closures.
///
/// * `registry` - Closure registry.
fn list_closures(registry: &ClosureRegistry) {
    for desc in registry.iter() {
        let params = desc.params.iter().map(|p| format!("{} {}", p.ty, p.name)).join(", ");
        println!(
            "{:<22} {:<16} {:<18} ({})",
            desc.name,
            desc.id.to_string(),
            desc.affinity.to_string(),
            params
        );
    }
}

/// Returns the composite budget given on the command line.
fn limits() -> CompositeLimits {
    CompositeLimits::new(
        OPTIONS.max_closures.unwrap_or(MAX_CLOSURE_ENTRIES),
        OPTIONS.max_pool_size.unwrap_or(MAX_POOL_SIZE),
    )
}

/// Builds the composites of one expression, prints them and optionally
/// samples selections.
///
/// * `registry` - Closure registry.
/// * `expr`     - The closure expression.
fn inspect(registry: &ClosureRegistry, expr: &str) -> Result<(), String> {
    let tree = parse_closure_expr(registry, expr)?;
    let basis = Basis3f::default();
    let limits = limits();

    let mut surface = CompositeSurfaceClosure::with_limits(limits);
    let mut subsurface = CompositeSubsurfaceClosure::with_limits(limits);
    let mut emission = CompositeEmissionClosure::with_limits(limits);

    // A failed build keeps the entries committed before the failure.
    let results = [
        surface.build(registry, &basis, &tree),
        subsurface.build(registry, &basis, &tree),
        emission.build(registry, &tree),
    ];
    for e in results.iter().filter_map(|r| r.as_ref().err()) {
        warn!("'{expr}': {e}");
    }

    if !OPTIONS.quiet {
        println!("{expr}");
        print_composite("surface", &surface);
        if surface.num_closures() > 0 {
            let iors = (0..surface.num_iors()).map(|i| surface.ior(i)).join(", ");
            let ior_cdf = surface.ior_cdf().iter().join(", ");
            println!("  iors [{iors}] cdf [{ior_cdf}]");
        }
        print_composite("subsurface", &subsurface);
        print_composite("emission", &emission);
        println!(
            "  opacity {} holdout {} background {}",
            process_transparency_tree(&tree),
            process_holdout_tree(&tree),
            process_background_tree(&tree)
        );
    }

    if OPTIONS.samples > 0 {
        let n_threads = OPTIONS.threads();
        let seed = OPTIONS.seed;
        let quiet = OPTIONS.quiet;

        let histogram = sample_selections(
            || {
                let mut c = CompositeSurfaceClosure::with_limits(limits);
                let _ = c.build(registry, &basis, &tree);
                c
            },
            OPTIONS.samples,
            n_threads,
            seed,
            quiet,
        );
        print_histogram("surface", &surface, &histogram);

        let histogram = sample_selections(
            || {
                let mut c = CompositeEmissionClosure::with_limits(limits);
                let _ = c.build(registry, &tree);
                c
            },
            OPTIONS.samples,
            n_threads,
            seed,
            quiet,
        );
        print_histogram("emission", &emission, &histogram);
    }

    Ok(())
}

/// Prints the entries and CDF of a composite.
///
/// * `label`     - Composite label.
/// * `composite` - The composite.
fn print_composite<C: Deref<Target = CompositeClosure>>(label: &str, composite: &C) {
    println!(
        "  {label}: {} entries, {} payload bytes",
        composite.num_closures(),
        composite.pool_bytes_used()
    );
    for (i, entry) in composite.entries().iter().enumerate() {
        println!(
            "    [{i}] {:<30} weight {} pdf {:.6} N {}",
            entry.closure_type.to_string(),
            entry.weight,
            entry.pdf_weight,
            entry.shading_basis.normal()
        );
    }
    if !composite.is_empty() {
        println!("    cdf [{}]", composite.cdf().iter().join(", "));
    }
}

/// Prints observed against expected selection frequencies.
///
/// * `label`     - Composite label.
/// * `composite` - The composite.
/// * `histogram` - Selection counts.
fn print_histogram<C: Deref<Target = CompositeClosure>>(label: &str, composite: &C, histogram: &[u64]) {
    let total: u64 = histogram.iter().sum();
    if total == 0 || OPTIONS.quiet {
        return;
    }

    println!("  {label} selections ({total} samples):");
    for (i, (entry, count)) in composite.entries().iter().zip(histogram).enumerate() {
        println!(
            "    [{i}] {:<30} observed {:.4} expected {:.4}",
            entry.closure_type.to_string(),
            *count as f64 / total as f64,
            entry.pdf_weight
        );
    }
}
