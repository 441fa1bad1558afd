/// User-toggled playback and effect flags.
///
/// A plain value passed into the controller and the render loop. The two loop
/// flags are mutually exclusive: enabling one clears the other.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlaybackSettings {
    loop_track: bool,
    loop_playlist: bool,
    vibration: bool,
}

impl PlaybackSettings {
    pub fn loop_track(self) -> bool {
        self.loop_track
    }

    pub fn loop_playlist(self) -> bool {
        self.loop_playlist
    }

    pub fn vibration(self) -> bool {
        self.vibration
    }

    pub fn toggle_loop_track(self) -> Self {
        let loop_track = !self.loop_track;
        Self {
            loop_track,
            loop_playlist: self.loop_playlist && !loop_track,
            ..self
        }
    }

    pub fn toggle_loop_playlist(self) -> Self {
        let loop_playlist = !self.loop_playlist;
        Self {
            loop_playlist,
            loop_track: self.loop_track && !loop_playlist,
            ..self
        }
    }

    pub fn toggle_vibration(self) -> Self {
        Self {
            vibration: !self.vibration,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enabling_one_loop_clears_the_other() {
        let s = PlaybackSettings::default().toggle_loop_track();
        assert!(s.loop_track() && !s.loop_playlist());

        let s = s.toggle_loop_playlist();
        assert!(s.loop_playlist() && !s.loop_track());

        let s = s.toggle_loop_track();
        assert!(s.loop_track() && !s.loop_playlist());
    }

    #[test]
    fn disabling_leaves_both_off() {
        let s = PlaybackSettings::default().toggle_loop_playlist().toggle_loop_playlist();
        assert!(!s.loop_track() && !s.loop_playlist());
    }

    #[test]
    fn vibration_is_independent() {
        let s = PlaybackSettings::default().toggle_loop_track().toggle_vibration();
        assert!(s.vibration());
        assert!(s.loop_track());
        assert!(!s.toggle_vibration().vibration());
    }
}
