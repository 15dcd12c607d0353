//! A counter with a bound label field.
//!
//! Run with `KNIT_LOG=knit_runtime=debug cargo run -p knit --example counter --features logging`
//! to see the mount and update spans.

use knit::prelude::*;

const PAGE: &str = r#"
<div id="app">
  <!-- state is shown twice: once as text, once in the field -->
  <label>Label <input v-model="label"></label>
  <p>{{ label }}: {{ count }}</p>
  <button @click="increment">+1</button>
  <button @click="reset">reset</button>
</div>
"#;

fn main() -> Result<(), VmError> {
    knit::init_logging();

    let vm = ViewModel::from_markup(
        PAGE,
        VmConfig::new("#app")
            .data("label", "Clicks")
            .data("count", 0)
            .method("increment", |vm, _| {
                let next = vm.get("count").and_then(|v| v.as_i64()).unwrap_or(0) + 1;
                if let Err(err) = vm.set("count", next) {
                    eprintln!("increment failed: {err}");
                }
            })
            .method("reset", |vm, _| {
                let _ = vm.set("count", 0);
            })
            .options(VmOptions::from_env()),
    )?;
    let doc = vm.document().clone();
    let show = || println!("{}", doc.inner_html(vm.root()));
    show();

    let buttons = doc.query_selector_all("#app button").unwrap_or_default();
    let input = doc.query_selector("#app input").ok().flatten();
    for _ in 0..3 {
        if let Some(&plus) = buttons.first() {
            doc.click(plus);
        }
    }
    show();

    if let Some(input) = input {
        doc.input(input, "Taps");
    }
    show();

    if let Some(&reset) = buttons.get(1) {
        doc.click(reset);
    }
    show();
    Ok(())
}
