pub mod png_image_writer;
