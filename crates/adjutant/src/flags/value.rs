use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use adjutant_common::mutex_lock_or_recover;

/// Storage behind a flag.
///
/// Values are shared (`Arc`) between the code that defined the flag and every
/// scope the flag was copied into, so `set` takes `&self`.
pub trait Value: Send + Sync {
    fn set(&self, raw: &str) -> Result<(), String>;

    fn get(&self) -> String;

    /// Boolean flags take no argument on the command line.
    fn is_bool(&self) -> bool {
        false
    }

    /// Shown next to the flag name in defaults output.
    fn type_name(&self) -> &'static str {
        "value"
    }
}

#[derive(Debug, Default)]
pub struct BoolValue(AtomicBool);

impl BoolValue {
    pub fn new(initial: bool) -> Arc<Self> {
        Arc::new(Self(AtomicBool::new(initial)))
    }

    pub fn value(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl Value for BoolValue {
    fn set(&self, raw: &str) -> Result<(), String> {
        let parsed = raw
            .parse::<bool>()
            .map_err(|_| format!("invalid boolean value {:?}", raw))?;
        self.0.store(parsed, Ordering::SeqCst);
        Ok(())
    }

    fn get(&self) -> String {
        self.value().to_string()
    }

    fn is_bool(&self) -> bool {
        true
    }

    fn type_name(&self) -> &'static str {
        "bool"
    }
}

#[derive(Debug, Default)]
pub struct StringValue(Mutex<String>);

impl StringValue {
    pub fn new(initial: impl Into<String>) -> Arc<Self> {
        Arc::new(Self(Mutex::new(initial.into())))
    }

    pub fn value(&self) -> String {
        mutex_lock_or_recover(&self.0).clone()
    }
}

impl Value for StringValue {
    fn set(&self, raw: &str) -> Result<(), String> {
        *mutex_lock_or_recover(&self.0) = raw.to_string();
        Ok(())
    }

    fn get(&self) -> String {
        self.value()
    }

    fn type_name(&self) -> &'static str {
        "string"
    }
}

/// Any value parsed with [`FromStr`], e.g. integers or durations in seconds.
#[derive(Debug)]
pub struct ParsedValue<T>(Mutex<T>);

impl<T> ParsedValue<T>
where
    T: FromStr + fmt::Display + Clone + Send + 'static,
{
    pub fn new(initial: T) -> Arc<Self> {
        Arc::new(Self(Mutex::new(initial)))
    }

    pub fn value(&self) -> T {
        mutex_lock_or_recover(&self.0).clone()
    }
}

impl<T> Value for ParsedValue<T>
where
    T: FromStr + fmt::Display + Clone + Send + 'static,
    T::Err: fmt::Display,
{
    fn set(&self, raw: &str) -> Result<(), String> {
        let parsed = raw.parse::<T>().map_err(|err| err.to_string())?;
        *mutex_lock_or_recover(&self.0) = parsed;
        Ok(())
    }

    fn get(&self) -> String {
        mutex_lock_or_recover(&self.0).to_string()
    }

    fn type_name(&self) -> &'static str {
        let full = std::any::type_name::<T>();
        full.rsplit("::").next().unwrap_or(full)
    }
}
