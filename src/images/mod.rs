//! Image directory selection and `image_list.txt` generation.

mod lister;
pub mod npy;

pub use lister::{
    ImageList, ImageSource, collect_images, image_dir_for, image_dir_name, make_image_list,
    write_image_list,
};
