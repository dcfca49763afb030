#![no_main]

use ferrous_di_compiler::{expand_text, DiError, Value};
use indexmap::IndexMap;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let mut params = IndexMap::new();
    params.insert("a".to_string(), Value::from("%b%/x"));
    params.insert("b".to_string(), Value::from("root"));
    params.insert("loop".to_string(), Value::from("%loop%"));
    params.insert("list".to_string(), Value::List(vec![Value::Int(1), Value::Int(2)]));
    params.insert("num".to_string(), Value::Int(7));

    // Expansion never panics; errors are limited to parameter problems
    match expand_text(text, &params) {
        Ok(_) => {}
        Err(DiError::MissingParameter(_))
        | Err(DiError::CircularParameter(_))
        | Err(DiError::NonScalarParameter { .. }) => {}
        Err(other) => panic!("unexpected expansion error: {}", other),
    }
});
