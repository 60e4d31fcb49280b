//! Orrery Discovery Page Example
//!
//! Drives both widgets from a minimal host loop against a fixture data
//! source: an autoplaying image carousel and a pair of filter fields
//! over an exoplanet table.
//!
//! Run with: cargo run -p orrery --example discovery_page

use std::sync::Arc;
use std::time::Duration;

use orrery::query::{QueryFuture, QueryOptions, QueryReply, Row, RowSource};
use orrery::widget::widgets::{Carousel, CarouselItem, FieldKind, FilterField, WhereFilter};
use orrery::widget::{Widget, WidgetEvent};
use orrery_core::TimerService;
use serde_json::json;

/// A data source backed by a small in-memory exoplanet table.
struct ExoplanetTable {
    rows: Vec<Row>,
}

impl ExoplanetTable {
    fn new() -> Self {
        let rows = [
            ("Kepler-22b", "Sun-like", "Transit"),
            ("Proxima b", "Proxima Centauri", "Radial Velocity"),
            ("TRAPPIST-1e", "TRAPPIST-1", "Transit"),
        ]
        .into_iter()
        .map(|(name, host, method)| {
            let mut row = Row::new();
            row.insert("pl_name".into(), json!(name));
            row.insert("host_name".into(), json!(host));
            row.insert("discovery_method".into(), json!(method));
            row
        })
        .collect();
        Self { rows }
    }
}

impl RowSource for ExoplanetTable {
    fn query(&self, options: QueryOptions) -> QueryFuture {
        let data = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .filter(|(name, _)| options.selects(name))
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect()
            })
            .collect();
        Box::pin(async move { Ok(QueryReply { data }) })
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    let timers = TimerService::new();
    let source = Arc::new(ExoplanetTable::new());

    let mut carousel = Carousel::new(
        vec![
            CarouselItem::new(1, "img/kepler-22b.png", "Artist's view of Kepler-22b"),
            CarouselItem::new(2, "img/proxima-b.png", "Proxima b surface render"),
            CarouselItem::new(3, "img/trappist-1e.png", "TRAPPIST-1e and its siblings"),
        ],
        timers.clone(),
    )
    .with_transition_delay(Duration::from_millis(400));

    carousel.current_changed.connect(|&index| {
        println!("carousel -> slide {index}");
    });

    let mut name_filter = FilterField::new("pl_name", FieldKind::Text, source.clone());
    let mut method_filter =
        FilterField::new("discovery_method", FieldKind::Enumerated, source.clone());

    let mut where_filter = WhereFilter::new();
    name_filter.set_where_filter(where_filter.clone());
    method_filter.set_where_filter(where_filter.clone());

    method_filter.where_changed.connect(|filter: &orrery::WhereFilter| {
        println!("filter state -> {filter:?}");
    });

    carousel.start_autoplay();
    name_filter.set_value("Kepler");

    // A few turns of the host loop.
    for _ in 0..8 {
        std::thread::sleep(Duration::from_millis(200));

        for id in timers.process_expired() {
            carousel.event(&mut WidgetEvent::timer(id));
        }
        method_filter.event(&mut WidgetEvent::poll());
    }

    where_filter = where_filter.with_field_attribute("discovery_method", "value", "Transit");
    method_filter.set_where_filter(where_filter);

    println!("carousel frame: {:?}", carousel.frame());
    println!("name filter frame: {:?}", name_filter.frame());
    println!("method filter frame: {:?}", method_filter.frame());
}
