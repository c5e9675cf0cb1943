use std::fs;
use std::path::PathBuf;

use whitted::SceneError;
use whitted::color::Color;
use whitted::scene::Scene;
use whitted::shape::ShapeKind;

const SCENE: &str = r#"{
    "camera": {
        "width": 11, "height": 11, "field_of_view": 1.0471975511965976,
        "from": [0, 0, -5], "to": [0, 0, 0], "up": [0, 1, 0]
    },
    "lights": [ { "position": [-10, 10, -10], "intensity": [1, 1, 1] } ],
    "shapes": [
        { "type": "obj", "file": "model.obj",
          "material": { "color": [1, 0.2, 0.2] } },
        { "type": "plane", "transforms": [ { "rotate_x": 1.5707963267948966 }, { "translate": [0, 0, 3] } ] }
    ]
}"#;

const MODEL: &str = "\
v -1 -1 0
v 1 -1 0
v 0 1 0
vt 0 0
f 1 2 3
";

/// A scratch directory holding `scene.json` and `model.obj`.
fn scratch_scene(name: &str) -> PathBuf {
    let dir = std::env::temp_dir()
        .join(format!("whitted-{}-{}", name, std::process::id()));
    fs::create_dir_all(&dir).unwrap();

    fs::write(dir.join("scene.json"), SCENE).unwrap();
    fs::write(dir.join("model.obj"), MODEL).unwrap();
    dir
}

#[test]
fn scene_file_with_obj_model_loads_and_renders() {
    let dir = scratch_scene("load");
    let scene = Scene::from_file(dir.join("scene.json")).unwrap();

    assert_eq!(scene.world.objects.len(), 2);
    assert_eq!(scene.world.lights.len(), 1);

    // The model's triangle is painted with the group's material.
    let model = scene.world.shape(scene.world.objects[0]);
    let groups = model.children().unwrap();
    assert_eq!(groups.len(), 1);

    let triangle = scene.world.shape(groups[0]).children().unwrap()[0];
    let triangle = scene.world.shape(triangle);
    assert!(matches!(triangle.kind, ShapeKind::Triangle(_)));
    assert_eq!(triangle.material.color, Color::rgb(1.0, 0.2, 0.2));

    let image = scene.camera.render(&scene.world, 5);
    let center = image.read_pixel(5, 5).unwrap();
    assert!(center.r > center.g && center.r > center.b);

    let parallel = scene.camera.render_parallel(&scene.world, 5, 4);
    assert_eq!(parallel, image);

    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn missing_model_file_is_an_io_error() {
    let dir = scratch_scene("missing");
    fs::remove_file(dir.join("model.obj")).unwrap();

    let err = Scene::from_file(dir.join("scene.json")).unwrap_err();
    assert!(matches!(err, SceneError::Io(_)));

    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn saved_image_is_a_ppm() {
    let dir = scratch_scene("save");
    let scene = Scene::from_file(dir.join("scene.json")).unwrap();

    let out = dir.join("out.ppm");
    scene.camera.render(&scene.world, 1).save(&out).unwrap();

    let ppm = fs::read_to_string(&out).unwrap();
    assert!(ppm.starts_with("P3\n11 11\n255\n"));
    assert!(ppm.ends_with('\n'));

    fs::remove_dir_all(dir).unwrap();
}
