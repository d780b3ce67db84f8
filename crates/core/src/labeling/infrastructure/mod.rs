pub mod box_label_annotator;
