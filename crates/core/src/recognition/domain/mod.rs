pub mod face_encoder;
pub mod face_encoding;
pub mod face_labeler;
pub mod face_matcher;
pub mod matching_face_labeler;
pub mod name_mapping;
pub mod reference_set;
