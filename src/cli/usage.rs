pub const EXAMPLES: &str = r#"
    1. cut a clip (seconds 10..20, top-left 100x100 square):

        handler cut --source ext/a.mp4 --target ext/a_out.mp4 --interval 0,10:0,20 --coordinates 0,0:100,100

    2. split the clip into frames at 30 fps:

        handler generate_images --source ext/a_out.mp4 --target_dir ext/input --fps 30

    3. pretrain the generator on datasets/realworld2cartoon/trainA:

        pretrain --dataset_name realworld2cartoon --input_size 256 --batch_size 8 --pretrain_num_iterations 3000

    4. rebuild a video from (stylized) frames, with the original audio:

        handler generate_videos --target ext/a_final.mp4 --from_dir ext/output --codec libx264 --audio_codec aac --fps 30 --audio true --source ext/a.mp4 --interval 0,10:0,20
"#;

pub const SHORT_USAGE: &str =
    "usage: handler <cut|generate_images|generate_videos|examples> [--flag value]...";
