//! Alarm melody sequencer, stepped on the 100 ms tick

/// Rest followed by C4..C5
const NOTE_HZ: [u16; 9] = [0, 262, 294, 330, 349, 392, 440, 494, 523];

/// (note, duration in ms)
const TUNE: [(u8, u16); 14] = [
    (1, 500),
    (1, 500),
    (5, 500),
    (5, 500),
    (6, 500),
    (6, 500),
    (5, 1000),
    (4, 500),
    (4, 500),
    (3, 500),
    (3, 500),
    (2, 500),
    (2, 500),
    (1, 1000),
];

const STEP_MS: u16 = 100;

/// Command for the tone collaborator
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Tone {
    Play(u16),
    Silence,
}

/// Each note sounds for its duration then rests for one step
#[derive(Clone, Debug)]
pub struct Melody {
    index: usize,
    steps_left: u16,
    sounding: bool,
}

impl Melody {
    pub const fn new() -> Self {
        Self {
            index: TUNE.len(),
            steps_left: 0,
            sounding: false,
        }
    }

    pub fn arm(&mut self) {
        self.index = 0;
        self.steps_left = TUNE[0].1 / STEP_MS;
    }

    pub fn stop(&mut self) {
        self.index = TUNE.len();
        self.steps_left = 0;
    }

    pub fn toggle(&mut self) {
        if self.is_playing() {
            self.stop();
        } else {
            self.arm();
        }
    }

    pub fn is_playing(&self) -> bool {
        self.index < TUNE.len()
    }

    /// Advance one 100 ms step
    pub fn step(&mut self) -> Option<Tone> {
        let Some(&(note, _)) = TUNE.get(self.index) else {
            return self.silence();
        };
        if self.steps_left == 0 {
            self.index += 1;
            self.steps_left = TUNE.get(self.index).map_or(0, |&(_, ms)| ms / STEP_MS);
            return self.silence();
        }
        self.steps_left -= 1;
        self.sounding = true;
        Some(Tone::Play(NOTE_HZ[note as usize]))
    }

    fn silence(&mut self) -> Option<Tone> {
        if self.sounding {
            self.sounding = false;
            Some(Tone::Silence)
        } else {
            None
        }
    }
}

impl Default for Melody {
    fn default() -> Self {
        Self::new()
    }
}
