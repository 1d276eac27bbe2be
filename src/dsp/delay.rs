use crate::dsp::{interpolation::bspline_43z, lfo::Lfo};

/*
Fractional Delay Line
=====================

A circular buffer with a modulated, interpolated read head and click-free
delay-time changes.

Buffer Layout
-------------

    index:  0 1 2 3 4 ................ capacity-1 | capacity .. capacity+4
            └──────────── ring ───────────────────┘└──── guard (copy of 0..5)

The interpolator reads 4 consecutive samples starting at the integer read
position. Without the guard, a read starting at capacity-2 would have to
wrap mid-kernel. Instead every write to index 0..GUARD is mirrored into the
guard region, so `buffer[p..p + 4]` is always contiguous and correct.

Read Position
-------------

    read = head - modulation - delay        (wrapped into 0..capacity)

`modulation` is the LFO output in samples. The fractional part of `read`
selects the point between buffer[p + 1] and buffer[p + 2] that the B-spline
evaluates.

Precondition: modulation depth plus the maximum delay time must stay inside
`capacity - GUARD`, otherwise the head can catch up with freshly written
samples. This is not checked per sample.

Retiming
--------

Jumping the read head to a new delay time produces a click. set_time()
instead starts a linear crossfade over RETIME_FADE_SAMPLES samples between a
read at the old time and a read at the new time:

    weight
      1 ┤╲                 ╱──── new time
        │  ╲             ╱
        │    ╲         ╱
        │      ╲     ╱
      0 ┤        ╲ ╱──────────── old time
        └───────────────────────→ samples
             8192 sample fade

fade_in + fade_out == 1 on every sample. A request that arrives while a fade
is still running is queued (last request wins) and starts as soon as the
current fade finishes, so fades never overlap.
*/

/// Extra samples past the ring that mirror its first samples.
pub const INTERPOLATION_GUARD: usize = 5;

/// Length of the crossfade used when the delay time changes.
pub const RETIME_FADE_SAMPLES: usize = 8192;

const FADE_STEP: f32 = 1.0 / RETIME_FADE_SAMPLES as f32;

pub struct DelayLine {
    sample_rate: f32,
    capacity: usize,
    buffer: Vec<f32>,
    head: usize,
    delay_samples: f32,
    next_delay_samples: f32,
    queued_seconds: Option<f32>,
    fade_remaining: usize,
    modulation: Lfo,
}

impl DelayLine {
    /// Allocate a delay line able to hold `max_delay_seconds` at `sample_rate`.
    ///
    /// This is the only allocation; nothing is resized afterwards.
    pub fn new(sample_rate: f32, max_delay_seconds: f32) -> Self {
        let capacity = ((sample_rate * max_delay_seconds).max(0.0) as usize)
            .max(INTERPOLATION_GUARD + 1);
        let max_delay = (capacity - INTERPOLATION_GUARD) as f32;
        let delay_samples = (sample_rate * 0.25).ceil().min(max_delay);

        Self {
            sample_rate,
            capacity,
            buffer: vec![0.0; capacity + INTERPOLATION_GUARD],
            head: 0,
            delay_samples,
            next_delay_samples: delay_samples,
            queued_seconds: None,
            fade_remaining: 0,
            modulation: Lfo::new(sample_rate),
        }
    }

    /// Ring length in samples (excluding the guard region).
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Longest delay time `set_time` will accept, in samples.
    pub fn max_delay_samples(&self) -> f32 {
        (self.capacity - INTERPOLATION_GUARD) as f32
    }

    /// Delay time currently being read (the old time while a fade runs).
    pub fn delay_samples(&self) -> f32 {
        self.delay_samples
    }

    /// Delay time a running fade is heading to.
    pub fn target_delay_samples(&self) -> f32 {
        self.next_delay_samples
    }

    pub fn is_retiming(&self) -> bool {
        self.fade_remaining > 0
    }

    /// Current `(fade_in, fade_out)` weights. `(0, 1)` when no fade runs.
    pub fn fade_weights(&self) -> (f32, f32) {
        if self.fade_remaining == 0 {
            return (0.0, 1.0);
        }
        let fade_in = (RETIME_FADE_SAMPLES - self.fade_remaining) as f32 * FADE_STEP;
        (fade_in, 1.0 - fade_in)
    }

    /// Request a new delay time. Clamped to `[0, max_delay_samples]`.
    ///
    /// Times shorter than a couple of samples are not useful: the read
    /// happens before the write, so a zero delay replays the oldest sample
    /// in the ring and the echo returns after the full capacity.
    pub fn set_time(&mut self, seconds: f32) {
        if self.fade_remaining > 0 {
            self.queued_seconds = Some(seconds);
            return;
        }

        self.next_delay_samples = self.samples_for(seconds);
        self.fade_remaining = RETIME_FADE_SAMPLES;
    }

    fn samples_for(&self, seconds: f32) -> f32 {
        let requested = (seconds * self.sample_rate).ceil();
        if requested.is_finite() {
            requested.clamp(0.0, self.max_delay_samples())
        } else {
            self.max_delay_samples()
        }
    }

    /// Modulation depth in samples of read-head displacement (smoothed).
    pub fn set_modulation_depth(&mut self, samples: f32) {
        self.modulation.change_amplitude(samples.max(0.0));
    }

    pub fn set_modulation_speed(&mut self, hz: f32) {
        self.modulation.change_frequency(hz.max(0.0));
    }

    pub fn modulation(&self) -> &Lfo {
        &self.modulation
    }

    #[inline]
    fn read(&self, delay_samples: f32, modulation: f32) -> f32 {
        let capacity = self.capacity as f64;
        let mut position = self.head as f64 - modulation as f64 - delay_samples as f64;
        if position < 0.0 {
            position += capacity;
        }
        if position >= capacity {
            position -= capacity;
        }

        let index = (position.floor() as usize).min(self.capacity - 1);
        let fraction = (position - index as f64) as f32;
        bspline_43z(&self.buffer[index..index + 4], fraction)
    }

    /// Write one sample and return the delayed, interpolated output.
    #[inline]
    pub fn step(&mut self, input: f32) -> f32 {
        let modulation = self.modulation.tick_sine();

        let output = if self.fade_remaining > 0 {
            let (fade_in, fade_out) = self.fade_weights();
            let blended = self.read(self.delay_samples, modulation) * fade_out
                + self.read(self.next_delay_samples, modulation) * fade_in;

            self.fade_remaining -= 1;
            if self.fade_remaining == 0 {
                self.delay_samples = self.next_delay_samples;
                if let Some(seconds) = self.queued_seconds.take() {
                    self.set_time(seconds);
                }
            }
            blended
        } else {
            self.read(self.delay_samples, modulation)
        };

        self.buffer[self.head] = input;
        if self.head < INTERPOLATION_GUARD {
            self.buffer[self.head + self.capacity] = input;
        }
        self.head += 1;
        if self.head == self.capacity {
            self.head = 0;
        }

        output
    }

    /// Process `input` into `output`. Both slices must have the same length.
    pub fn process_block(&mut self, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(input.len(), output.len());

        for (out, &sample) in output.iter_mut().zip(input.iter()) {
            *out = self.step(sample);
        }
    }

    /// In-place variant of [`process_block`](Self::process_block).
    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.step(*sample);
        }
    }

    /// Silence the buffer and jump straight to the latest requested delay
    /// time, skipping any fade. Keeps all other settings.
    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.head = 0;
        if let Some(seconds) = self.queued_seconds.take() {
            self.next_delay_samples = self.samples_for(seconds);
        }
        self.delay_samples = self.next_delay_samples;
        self.fade_remaining = 0;
    }
}
