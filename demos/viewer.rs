use pose_retarget::playback::PlaybackState;
use pose_retarget::settings::Settings;
use pose_retarget::skeleton::Skeleton;
use pose_retarget::visualize::visualize_playback;

fn main() {
    env_logger::init();

    ////////////////////////////// loading the rig ///////////////////////////////////////////
    // from a file
    let skeleton = Skeleton::from_rig_file("./assets/avatar_rig.json").expect("rig should load");

    // or from a string
    // (`include_str` works at compile time and so has a different base path than `from_rig_file` - ignore the difference)
    let rig_string: &str = include_str!("../assets/avatar_rig.json");
    let skeleton_from_string = Skeleton::from_rig_str(rig_string).expect("rig should load");
    assert_eq!(skeleton.len(), skeleton_from_string.len());

    // bone names are listed parent first, indented by depth
    for name in skeleton.bone_names() {
        println!("{name}");
    }

    ////////////////////////////// loading the pose ///////////////////////////////////////////
    let mut playback = PlaybackState::new(Settings::load());
    // the skeleton goes in first so its rest pose is captured before any frame is applied
    playback.load_skeleton(skeleton);
    playback
        .load_pose_file("./assets/frame.pose")
        .expect("pose file should load");

    {
        let frames = playback.frames();
        // every frame has the full body / hand / face layout
        assert!(frames.iter().all(|frame| frame.has_shape()));
        // coordinates are in unit space after loading
        assert!(frames
            .iter()
            .flat_map(|frame| frame.keypoints())
            .all(|p| p.x <= 1.0 && p.y <= 1.0));
    }

    //////////////////////////////// visualize playback ////////////////
    // (use scale when your rig is in different units than meters, e.g. centimeters)
    visualize_playback(playback, 1.0);
}
