//! Session fixtures
//!
//! A YAML description of a song and the browser catalogue, used to start the
//! simulator with something to play. Nothing is ever written back.

use crate::model::{
    BrowserItem, Chain, Clip, ClipKind, Device, DrumPad, SessionLimits, Song, Track, TrackKind,
};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Demo session used when no session file is configured
pub const DEMO_SESSION: &str = r#"
tempo: 124
scenes: [Intro, Verse, "", Outro]
tracks:
  - name: Drums
    kind: midi
    devices: [Drum Rack]
    drum_pads:
      - name: Kick
        devices: [Simpler]
      - name: Snare
        devices: [Simpler]
      - name: Clap
    clips:
      - { scene: 0, name: Four Floor, loop_end: 4 }
      - { scene: 1, name: Break, loop_end: 8, envelopes: [Volume] }
      - { scene: 3, name: Fill, loop_end: 2 }
  - name: Bass
    kind: midi
    devices: [Operator, Saturator]
    clips:
      - { scene: 1, name: Walking, loop_end: 16, envelopes: [Filter Freq] }
      - { scene: 2, loop_end: 8 }
  - name: Vox
    kind: audio
    clips:
      - { scene: 1, name: Hook, loop_end: 95.5, warping: false }
      - { scene: 3, name: Adlib, loop_end: 16 }
  - name: ""
    kind: audio
return_tracks: [A Reverb, B Delay]
browser:
  - { name: Operator, kind: instrument }
  - { name: Wavetable, kind: instrument }
  - { name: Drum Rack, kind: instrument }
  - { name: Reverb, kind: audio_effect }
  - { name: Compressor, kind: audio_effect }
  - { name: EQ Eight, kind: audio_effect }
  - { name: Arpeggiator, kind: midi_effect }
  - { name: Chord, kind: midi_effect }
"#;

#[derive(Debug, Deserialize)]
struct SessionFile {
    #[serde(default = "default_tempo")]
    tempo: f64,
    #[serde(default)]
    scenes: Vec<String>,
    #[serde(default)]
    tracks: Vec<TrackEntry>,
    #[serde(default)]
    return_tracks: Vec<String>,
    #[serde(default)]
    browser: Vec<BrowserItem>,
}

fn default_tempo() -> f64 {
    120.0
}

#[derive(Debug, Deserialize)]
struct TrackEntry {
    name: String,
    kind: TrackKind,
    #[serde(default)]
    devices: Vec<String>,
    #[serde(default)]
    drum_pads: Vec<PadEntry>,
    #[serde(default)]
    clips: Vec<ClipEntry>,
}

#[derive(Debug, Deserialize)]
struct PadEntry {
    name: String,
    #[serde(default)]
    devices: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ClipEntry {
    scene: usize,
    #[serde(default)]
    name: String,
    #[serde(default)]
    loop_start: f64,
    loop_end: f64,
    #[serde(default = "default_warping")]
    warping: bool,
    #[serde(default)]
    envelopes: Vec<String>,
}

fn default_warping() -> bool {
    true
}

/// A song plus the items its browser offers
pub struct Session {
    pub song: Song,
    pub browser_items: Vec<BrowserItem>,
}

pub fn load_session<P: AsRef<Path>>(path: P, limits: SessionLimits) -> Result<Session> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read session file {}", path.display()))?;
    parse_session(&contents, limits)
        .with_context(|| format!("Failed to load session file {}", path.display()))
}

pub fn demo_session(limits: SessionLimits) -> Result<Session> {
    parse_session(DEMO_SESSION, limits).context("Failed to load demo session")
}

pub fn parse_session(contents: &str, limits: SessionLimits) -> Result<Session> {
    let file: SessionFile = serde_yaml::from_str(contents).context("Invalid session YAML")?;

    if file.scenes.is_empty() {
        bail!("a session needs at least one scene");
    }
    if file.tracks.len() > limits.max_tracks {
        bail!(
            "{} tracks exceed the track limit of {}",
            file.tracks.len(),
            limits.max_tracks
        );
    }

    let mut song = Song::new(limits);
    song.tempo = file.tempo;
    for scene in &file.scenes {
        song.add_scene(scene);
    }

    for entry in file.tracks {
        if entry.kind == TrackKind::Return {
            bail!("track '{}' is a return track; list it under return_tracks", entry.name);
        }
        let track = build_track(entry, song.scenes.len())?;
        song.add_track(track);
    }
    for name in &file.return_tracks {
        song.add_track(Track::new(name, TrackKind::Return, 0));
    }

    Ok(Session {
        song,
        browser_items: file.browser,
    })
}

fn build_track(entry: TrackEntry, num_scenes: usize) -> Result<Track> {
    let mut track = Track::new(&entry.name, entry.kind, num_scenes);
    track.devices = entry.devices.into_iter().map(|name| Device { name }).collect();
    track.drum_pads = entry
        .drum_pads
        .into_iter()
        .map(|pad| DrumPad {
            name: pad.name,
            chains: if pad.devices.is_empty() {
                Vec::new()
            } else {
                vec![Chain {
                    devices: pad.devices.into_iter().map(|name| Device { name }).collect(),
                }]
            },
        })
        .collect();

    for clip in entry.clips {
        let kind = match entry.kind {
            TrackKind::Audio => ClipKind::Audio {
                warping: clip.warping,
            },
            _ => ClipKind::Midi,
        };
        let Some(slot) = track.clip_slots.get_mut(clip.scene) else {
            bail!(
                "clip '{}' on track '{}' refers to scene {} of {}",
                clip.name,
                entry.name,
                clip.scene,
                num_scenes
            );
        };
        let mut built = Clip::new(&clip.name, kind);
        built.loop_start = clip.loop_start;
        built.loop_end = clip.loop_end;
        built.playing_position = clip.loop_start;
        built.envelopes = clip.envelopes;
        slot.clip = Some(built.into_ref());
    }
    Ok(track)
}
