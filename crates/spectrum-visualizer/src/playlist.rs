use std::fmt;

/// Stable identity of a track for the life of the playlist
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackId(u64);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "track-{}", self.0)
    }
}

/// Owned reference to a playable resource, e.g. an object URL for an upload.
///
/// Not `Clone`: handing it to a [`ResourceReleaser`] consumes it, so a handle
/// can be released at most once.
#[derive(Debug, PartialEq, Eq)]
pub struct ResourceHandle {
    url: String,
}

impl ResourceHandle {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Frees the platform resource behind a handle
pub trait ResourceReleaser {
    fn release(&self, handle: ResourceHandle);
}

#[derive(Debug)]
pub struct Track {
    id: TrackId,
    name: String,
    resource: ResourceHandle,
    duration: f64, // seconds, 0 until metadata loads
}

impl Track {
    pub fn id(&self) -> TrackId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resource(&self) -> &ResourceHandle {
        &self.resource
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }
}

/// What the UI shows for one playlist row
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackSummary {
    pub id: TrackId,
    pub name: String,
    pub duration: String,
}

/// Result of removing a track
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Removed {
    pub id: TrackId,
    pub index: usize,
    pub was_selected: bool,
}

/// Ordered tracks plus the current selection.
///
/// The playlist is the only owner of track resources and the only place they
/// are released. A resource that is still the media element's source when its
/// track is removed is parked and released on [`Playlist::release_parked`].
pub struct Playlist {
    tracks: Vec<Track>,
    selected: Option<usize>,
    next_id: u64,
    parked: Vec<ResourceHandle>,
    releaser: Box<dyn ResourceReleaser>,
}

impl Playlist {
    pub fn new(releaser: Box<dyn ResourceReleaser>) -> Self {
        Self {
            tracks: Vec::new(),
            selected: None,
            next_id: 0,
            parked: Vec::new(),
            releaser,
        }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn index_of(&self, id: TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected(&self) -> Option<&Track> {
        self.selected.and_then(|idx| self.tracks.get(idx))
    }

    /// Append a track and take ownership of its resource
    pub fn add(&mut self, name: impl Into<String>, resource: ResourceHandle) -> TrackId {
        let id = TrackId(self.next_id);
        self.next_id += 1;
        self.tracks.push(Track {
            id,
            name: name.into(),
            resource,
            duration: 0.0,
        });
        id
    }

    /// Select `index`; out-of-range indices are ignored
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.tracks.len() {
            return false;
        }
        self.selected = Some(index);
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Remove a track, keeping the selection on the same track when possible.
    ///
    /// `in_use` marks the resource as still attached to the media element; it
    /// is parked instead of released.
    pub fn remove(&mut self, id: TrackId, in_use: bool) -> Option<Removed> {
        let index = self.index_of(id)?;
        let track = self.tracks.remove(index);

        let was_selected = self.selected == Some(index);
        self.selected = match self.selected {
            Some(current) if current == index => None,
            Some(current) if current > index => Some(current - 1),
            other => other,
        };

        if in_use {
            self.parked.push(track.resource);
        } else {
            self.releaser.release(track.resource);
        }

        Some(Removed {
            id,
            index,
            was_selected,
        })
    }

    /// Move the track at `from` to position `to`; the selection follows its track
    pub fn move_track(&mut self, from: usize, to: usize) -> bool {
        let len = self.tracks.len();
        if from >= len || to >= len {
            return false;
        }
        if from == to {
            return true;
        }
        let selected_id = self.selected().map(Track::id);
        let track = self.tracks.remove(from);
        self.tracks.insert(to, track);
        self.selected = selected_id.and_then(|id| self.index_of(id));
        true
    }

    /// Record a duration reported by metadata; returns false for unknown ids
    /// and unusable values
    pub fn set_duration(&mut self, id: TrackId, seconds: f64) -> bool {
        if !seconds.is_finite() || seconds < 0.0 {
            return false;
        }
        match self.tracks.iter_mut().find(|t| t.id == id) {
            Some(track) => {
                track.duration = seconds;
                true
            }
            None => false,
        }
    }

    pub fn summaries(&self) -> Vec<TrackSummary> {
        self.tracks
            .iter()
            .map(|t| TrackSummary {
                id: t.id,
                name: t.name.clone(),
                duration: format_time(t.duration),
            })
            .collect()
    }

    /// Index after the selection, or the first track when nothing is selected
    pub fn next_index(&self, wrap: bool) -> Option<usize> {
        let len = self.tracks.len();
        if len == 0 {
            return None;
        }
        match self.selected {
            Some(idx) if idx + 1 < len => Some(idx + 1),
            Some(_) if wrap => Some(0),
            Some(_) => None,
            None => Some(0),
        }
    }

    pub fn previous_index(&self, wrap: bool) -> Option<usize> {
        let len = self.tracks.len();
        if len == 0 {
            return None;
        }
        match self.selected {
            Some(idx) if idx > 0 => Some(idx - 1),
            Some(_) if wrap => Some(len - 1),
            Some(_) => None,
            None => Some(0),
        }
    }

    /// Release resources of removed tracks once nothing plays them any more
    pub fn release_parked(&mut self) {
        for handle in self.parked.drain(..) {
            self.releaser.release(handle);
        }
    }

    /// Drop every track and release its resource. Parked resources wait for
    /// [`Playlist::release_parked`].
    pub fn clear(&mut self) {
        self.selected = None;
        for track in self.tracks.drain(..) {
            self.releaser.release(track.resource);
        }
    }
}

impl Drop for Playlist {
    fn drop(&mut self) {
        self.clear();
        self.release_parked();
    }
}

/// Format seconds as `MM:SS`
pub fn format_time(seconds: f64) -> String {
    let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    let mins = (seconds / 60.0) as u32;
    let secs = (seconds % 60.0) as u32;
    format!("{mins:02}:{secs:02}")
}
