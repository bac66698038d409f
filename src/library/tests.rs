use super::Track;
use std::collections::HashSet;
use std::path::Path;

#[test]
fn from_file_strips_extension_and_keeps_path() {
    let t = Track::from_file(Path::new("/music/Take Five.mp3"), "mp3");
    assert_eq!(t.title(), "Take Five");
    assert_eq!(t.path(), Path::new("/music/Take Five.mp3"));
}

#[test]
fn from_file_only_strips_the_final_suffix() {
    let t = Track::from_file(Path::new("/music/a.mp3.mp3"), "mp3");
    assert_eq!(t.title(), "a.mp3");

    let t = Track::from_file(Path::new("/music/.mp3"), "mp3");
    assert_eq!(t.title(), "");
}

#[test]
fn from_file_makes_relative_paths_absolute() {
    let t = Track::from_file(Path::new("relative/song.mp3"), "mp3");
    assert!(t.path().is_absolute());
    assert!(t.path().ends_with("relative/song.mp3"));
}

#[test]
#[should_panic]
fn from_file_panics_when_name_is_shorter_than_suffix() {
    let _ = Track::from_file(Path::new("/music/mp3"), "mp3");
}

#[test]
fn equality_is_by_path_only() {
    let a = Track::new("One", "/music/x.mp3");
    let b = Track::new("Another title", "/music/x.mp3");
    let c = Track::new("One", "/music/y.mp3");

    assert_eq!(a, b);
    assert_ne!(a, c);

    let set: HashSet<Track> = [a, b, c].into_iter().collect();
    assert_eq!(set.len(), 2);
}
