#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Any buffer either loads or fails with a diagnostic; neither may panic.
    match koml::load(data) {
        Ok(table) => {
            // Whatever loaded must survive a print/reload cycle unchanged.
            let printed = table.to_string();
            let reloaded = koml::load_str(&printed).expect("printed table failed to reload");
            assert_eq!(reloaded, table);
        }
        Err(err) => {
            let _ = err.to_string();
        }
    }
});
