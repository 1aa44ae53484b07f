pub mod attribute_binding;
