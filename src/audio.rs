/// Discrete sound triggers the state machine emits; playback itself lives
/// outside the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Round satisfied before the timer ran out.
    Success,
    /// Round timer expired.
    Failure,
    /// Session over, end screen entered.
    Outro,
    /// (Re)start the ambient loop at full volume for a live round.
    AmbientLoud,
    /// (Re)start the ambient loop quietly for the menu.
    AmbientQuiet,
    /// Stop the ambient track while outcome feedback plays.
    AmbientStop,
}

pub trait AudioSink {
    fn play(&mut self, cue: Cue);
}

/// Default sink for installations without speakers wired up: cues are only
/// recorded in the log.
#[derive(Debug, Default)]
pub struct LogAudio;

impl AudioSink for LogAudio {
    fn play(&mut self, cue: Cue) {
        tracing::debug!(?cue, "audio cue");
    }
}

/// Test sink capturing cues in emission order.
#[derive(Debug, Default)]
pub struct RecordingAudio {
    pub cues: Vec<Cue>,
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, cue: Cue) {
        self.cues.push(cue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sink_keeps_order() {
        let mut sink = RecordingAudio::default();
        sink.play(Cue::AmbientLoud);
        sink.play(Cue::Success);
        sink.play(Cue::Outro);
        assert_eq!(sink.cues, vec![Cue::AmbientLoud, Cue::Success, Cue::Outro]);
    }
}
