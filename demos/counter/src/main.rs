use std::rc::Rc;

use serde_json::json;
use stateful_core::prelude::*;

struct Counter {
    events: Emitter,
}

impl Evented for Counter {
    fn emitter(&self) -> &Emitter {
        &self.events
    }
}

impl Stateful for Counter {}

impl Counter {
    fn count(&self) -> i64 {
        self.state()
            .get("count")
            .and_then(|v| v.as_i64())
            .unwrap_or_default()
    }

    fn increment(&self) -> Result<(), StateError> {
        self.try_set_state(json!({ "count": self.count() + 1 }))
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let options: StatefulOptions =
        serde_json::from_value(json!({ "state": { "count": 0, "meta": { "label": "clicks" } } }))?;
    let counter: Rc<Counter> = stateful::<Counter>()
        .extend("Counter")
        .create(Counter { events: Emitter::new() }, options);

    let handle = counter.on_state_changed(|ev| {
        log::info!("{} -> {}", ev.event_type(), ev.state);
    });

    for _ in 0..3 {
        counter.increment()?;
    }
    counter.try_set_state(json!({ "meta": { "last": "reset" } }))?;
    handle.destroy();

    println!("{}", serde_json::to_string_pretty(&counter.state())?);
    Ok(())
}
