pub mod item_form;
