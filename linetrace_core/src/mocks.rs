//! Test and helper channels for linetrace_core

use linetrace_traits::{BoxError, HardwareChannel};

/// Serves scripted raw values per sensor.
///
/// Each sensor has its own sequence; every `sample_raw()` on that sensor
/// returns the next value and the last value repeats once the sequence ends.
/// Counts every call so tests can assert how much hardware traffic an
/// operation caused.
#[derive(Debug, Clone, Default)]
pub struct ScriptedChannel {
    script: Vec<Vec<u16>>,
    cursors: Vec<usize>,
    selected: Option<u8>,
    pub selects: Vec<u8>,
    pub samples: usize,
}

impl ScriptedChannel {
    /// One sequence per sensor.
    pub fn new(script: Vec<Vec<u16>>) -> Self {
        let cursors = vec![0; script.len()];
        Self {
            script,
            cursors,
            ..Self::default()
        }
    }

    /// Every sensor returns the same constant forever.
    pub fn constant(values: &[u16]) -> Self {
        Self::new(values.iter().map(|&v| vec![v]).collect())
    }

    /// Total hardware calls (selects plus samples).
    pub fn calls(&self) -> usize {
        self.selects.len() + self.samples
    }
}

impl HardwareChannel for ScriptedChannel {
    fn select_channel(&mut self, index: u8) -> Result<(), BoxError> {
        if usize::from(index) >= self.script.len() {
            return Err(format!("scripted channel {index} not present").into());
        }
        self.selects.push(index);
        self.selected = Some(index);
        Ok(())
    }

    fn sample_raw(&mut self) -> Result<u16, BoxError> {
        let i = usize::from(self.selected.ok_or("sample before select")?);
        let seq = &self.script[i];
        let cur = &mut self.cursors[i];
        let v = seq.get(*cur).or_else(|| seq.last()).copied().unwrap_or(0);
        *cur += 1;
        self.samples += 1;
        Ok(v)
    }
}

/// Fails every `sample_raw()` after the first `ok_samples`.
#[derive(Debug, Clone)]
pub struct FailingChannel {
    ok_samples: usize,
    served: usize,
    value: u16,
}

impl FailingChannel {
    pub fn new(ok_samples: usize, value: u16) -> Self {
        Self {
            ok_samples,
            served: 0,
            value,
        }
    }
}

impl HardwareChannel for FailingChannel {
    fn select_channel(&mut self, _index: u8) -> Result<(), BoxError> {
        Ok(())
    }

    fn sample_raw(&mut self) -> Result<u16, BoxError> {
        if self.served >= self.ok_samples {
            return Err(Box::new(std::io::Error::other("adc not responding")));
        }
        self.served += 1;
        Ok(self.value)
    }
}
