// Specimen Demo
// Registers the zoo and novel test functions and runs the bundled spec files

use color_eyre::Result;
use serde::Deserialize;
use specimen::{BoxRegistry, Fault, HarnessConfig, SpecFile};
use std::path::Path;
use tracing_subscriber::{fmt, EnvFilter};

const SPEC_FILES: [&str; 2] = ["zoo.yaml", "novel.yaml"];

fn main() -> Result<()> {
    color_eyre::install()?;

    // Diagnostics go to stderr so the report on stdout stays machine-readable
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let data_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
    let files = SPEC_FILES
        .iter()
        .map(|name| SpecFile::read_local(data_dir.join(name)))
        .collect::<Result<Vec<_>, _>>()?;

    let registry = zoo_boxes(novel_boxes(BoxRegistry::new()));
    let mut harness = specimen::register(files, registry).with_config(HarnessConfig::from_env());

    let summary = harness.run_to_stdout()?;
    tracing::info!(outcome = %summary.outcome, tiles = summary.stats.tile_count, "demo finished");
    Ok(())
}

// =============================================================================
// Zoo
// =============================================================================

fn sound_of(animal: &str) -> Option<&'static str> {
    match animal {
        "cat" => Some("meow"),
        "cow" => Some("moo"),
        "dog" => Some("woof"),
        "dragon" => Some("roar"),
        _ => None,
    }
}

/// Square meters one animal needs
fn area_of(animal: &str) -> Option<i64> {
    match animal {
        "cat" => Some(2),
        "cow" => Some(20),
        "elephant" => Some(40),
        _ => None,
    }
}

fn zoo_boxes(registry: BoxRegistry) -> BoxRegistry {
    registry
        .with("sound", |ctx, tile| {
            let animal = tile.str("animal")?;
            let Some(sound) = sound_of(animal) else {
                return ctx.abort(format!("there is no {} at this zoo", animal));
            };
            ctx.expect_equal(sound, tile.str("sound")?, animal);
            Ok(())
        })
        .with("enclosure", |ctx, tile| {
            let animal = tile.str("animal")?;
            let count = tile.int("count")?;
            let available = tile.int("enclosure_area")?;
            let area = area_of(animal)
                .ok_or_else(|| Fault::msg(format!("unknown animal {}", animal)))?;
            let needed = area * count;
            if needed > available {
                ctx.fail(format!(
                    "{} {}s need {}m2, the enclosure has {}m2",
                    count, animal, needed, available
                ));
            }
            Ok(())
        })
        .with("escape", |_, tile| {
            let animal = tile.str("animal")?;
            panic!("the {} escaped while {} was not looking", animal, tile.str("keeper")?);
        })
}

// =============================================================================
// Novel
// =============================================================================

#[derive(Debug, Deserialize)]
struct Book {
    title: String,
    left_page: i64,
    size: i64,
}

impl Book {
    /// Turn `count` pages (negative turns back), staying inside the book
    fn turn_page(&mut self, count: i64) {
        self.left_page = (self.left_page + 2 * count).clamp(0, (self.size - 1).max(0));
    }
}

fn novel_boxes(registry: BoxRegistry) -> BoxRegistry {
    registry
        .with("turn_page", |ctx, tile| {
            let mut book: Book = tile.deserialize("book")?;
            book.turn_page(tile.int("turn_page_count")?);
            ctx.expect_equal(book.left_page, tile.int("expected_left_page")?, &book.title);
            Ok(())
        })
        .with("stays_in_book", |ctx, tile| {
            let mut book: Book = tile.deserialize("book")?;
            book.turn_page(tile.int("turn_page_count")?);
            if !(0..book.size).contains(&book.left_page) {
                ctx.fail(format!("page {} is outside {}", book.left_page, book.title));
            }
            Ok(())
        })
        .with("get_page", |ctx, tile| {
            let book: Book = tile.deserialize("book")?;
            ctx.expect_equal(book.left_page, tile.int("expected_page")?, &book.title);
            Ok(())
        })
}
