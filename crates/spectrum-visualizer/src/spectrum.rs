/// Anything that can report a byte magnitude spectrum
pub trait FrequencySource {
    fn bin_count(&self) -> usize;

    /// Write magnitudes in [0, 255], lowest frequency first
    fn fill_frequency_data(&self, buf: &mut [u8]);
}

/// Pulls the current spectrum into a buffer that is reused every frame
pub struct SpectrumSampler {
    bins: Vec<u8>,
}

impl SpectrumSampler {
    pub fn new(bin_count: usize) -> Self {
        Self {
            bins: vec![0u8; bin_count],
        }
    }

    pub fn sample<S: FrequencySource + ?Sized>(&mut self, source: &S) -> &[u8] {
        let len = source.bin_count();
        // only reallocates if the analyser was reconfigured
        if self.bins.len() != len {
            self.bins.resize(len, 0);
        }
        source.fill_frequency_data(&mut self.bins);
        &self.bins
    }

    pub fn bins(&self) -> &[u8] {
        &self.bins
    }
}

/// Mean magnitude normalized to 0.0..=1.0
pub fn average_magnitude(bins: &[u8]) -> f32 {
    if bins.is_empty() {
        return 0.0;
    }
    let sum: u32 = bins.iter().map(|&x| u32::from(x)).sum();
    sum as f32 / (bins.len() as f32 * 255.0)
}
